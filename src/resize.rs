//! Viewport resize handling

use tracing::debug;

use crate::scene::PerspectiveCamera;

/// Upper bound on device pixel ratio, bounding fill-rate on dense displays
pub const MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical size
    pub width: f32,
    pub height: f32,
    /// Clamped device pixel ratio
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Surface size in physical pixels at the clamped ratio.
    pub fn physical_size(&self) -> [u32; 2] {
        [
            (self.width * self.pixel_ratio).round().max(1.0) as u32,
            (self.height * self.pixel_ratio).round().max(1.0) as u32,
        ]
    }
}

#[derive(Debug, Default)]
pub struct ResizeHandler {
    viewport: Option<Viewport>,
}

impl ResizeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Apply a size-changed notification. Returns false when nothing changed;
    /// zero-sized viewports are ignored.
    pub fn handle(
        &mut self,
        width: f32,
        height: f32,
        device_pixel_ratio: f32,
        camera: &mut PerspectiveCamera,
    ) -> bool {
        if !(width > 0.0 && height > 0.0) {
            return false;
        }
        let viewport = Viewport {
            width,
            height,
            pixel_ratio: device_pixel_ratio.clamp(f32::MIN_POSITIVE, MAX_PIXEL_RATIO),
        };
        if self.viewport == Some(viewport) {
            return false;
        }

        camera.aspect = viewport.aspect();
        camera.update_projection_matrix();
        self.viewport = Some(viewport);

        debug!(
            width,
            height,
            pixel_ratio = viewport.pixel_ratio,
            "viewport resized"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_camera_aspect() {
        let mut camera = PerspectiveCamera::default();
        let mut handler = ResizeHandler::new();
        assert!(handler.handle(1600.0, 800.0, 1.0, &mut camera));
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut camera = PerspectiveCamera::default();
        let mut handler = ResizeHandler::new();
        handler.handle(1280.0, 720.0, 1.5, &mut camera);
        let once = (camera.clone(), handler.viewport());

        assert!(!handler.handle(1280.0, 720.0, 1.5, &mut camera));
        assert_eq!((camera, handler.viewport()), once);
    }

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        let mut camera = PerspectiveCamera::default();
        let mut handler = ResizeHandler::new();
        handler.handle(800.0, 600.0, 3.0, &mut camera);
        let vp = handler.viewport().unwrap();
        assert_eq!(vp.pixel_ratio, MAX_PIXEL_RATIO);
        assert_eq!(vp.physical_size(), [1600, 1200]);

        // 3.0 and 4.0 both clamp to 2.0: no change
        assert!(!handler.handle(800.0, 600.0, 4.0, &mut camera));
    }

    #[test]
    fn zero_size_is_ignored() {
        let mut camera = PerspectiveCamera::default();
        let mut handler = ResizeHandler::new();
        assert!(!handler.handle(0.0, 600.0, 1.0, &mut camera));
        assert!(handler.viewport().is_none());
        assert_eq!(camera.aspect, 1.0);
    }
}

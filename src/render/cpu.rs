//! CPU fallback renderer (native --use-cpu, or no wgpu render state)

use eframe::egui;
use glam::{Vec2, Vec3};

use super::{attenuated_size, shade, SPARKLE_SIZE_SCALE};
use crate::frame::{Frame, RenderTarget};
use crate::scene::Blending;

/// Most points painted per cloud; larger clouds are strided.
pub const MAX_CPU_POINTS: usize = 20_000;

/// Map NDC to a screen position inside `rect`.
pub fn to_screen(rect: egui::Rect, ndc: Vec2) -> egui::Pos2 {
    egui::pos2(
        rect.center().x + ndc.x * rect.width() * 0.5,
        rect.center().y - ndc.y * rect.height() * 0.5,
    )
}

/// Step through `len` items so at most `max` are visited.
pub fn sample_stride(len: usize, max: usize) -> usize {
    if max == 0 {
        return len.max(1);
    }
    len.div_ceil(max).max(1)
}

fn to_color(rgb: [f32; 3], alpha: f32, blending: Blending) -> egui::Color32 {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * alpha.clamp(0.0, 1.0) * 255.0) as u8);
    match blending {
        // Premultiplied colour with zero alpha adds onto what's below
        Blending::Additive => egui::Color32::from_rgba_premultiplied(r, g, b, 0),
        Blending::Normal => {
            egui::Color32::from_rgba_premultiplied(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0) as u8)
        }
    }
}

pub struct CpuTarget<'a> {
    pub painter: &'a egui::Painter,
    pub rect: egui::Rect,
    pub max_points: usize,
    /// Points painted by the last render call
    pub painted: usize,
}

impl<'a> CpuTarget<'a> {
    pub fn new(painter: &'a egui::Painter, rect: egui::Rect) -> Self {
        Self {
            painter,
            rect,
            max_points: MAX_CPU_POINTS,
            painted: 0,
        }
    }

    fn paint_point(&mut self, frame: &Frame<'_>, world: Vec3, size: f32, color: egui::Color32) {
        let Some((ndc, depth)) = frame.camera.project(world) else {
            return;
        };
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
            return;
        }
        let radius = (attenuated_size(size, self.rect.height(), depth) * 0.5).max(0.5);
        self.painter
            .circle_filled(to_screen(self.rect, ndc), radius, color);
        self.painted += 1;
    }
}

impl RenderTarget for CpuTarget<'_> {
    fn render(&mut self, frame: &Frame<'_>) {
        self.painted = 0;
        let ambient = frame.scene.ambient();
        let mut sparkle_size = 0.02 * SPARKLE_SIZE_SCALE;

        for (_, object, cloud) in frame.scene.point_clouds() {
            let model = object.transform.matrix();
            let material = &cloud.material;
            let color = to_color(shade(material.color, ambient), 1.0, material.blending);
            let stride = sample_stride(cloud.geometry.len(), self.max_points);
            for point in cloud.geometry.points().step_by(stride) {
                self.paint_point(frame, model.transform_point3(point), material.size, color);
            }
            sparkle_size = material.size * SPARKLE_SIZE_SCALE;
        }

        let now = frame.elapsed as f32;
        for sparkle in frame.sparkles.active(now) {
            let color = to_color(ambient, sparkle.fade(now), Blending::Additive);
            self.paint_point(frame, Vec3::from(sparkle.position), sparkle_size, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_map_to_rect_corners() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(200.0, 100.0));
        assert_eq!(to_screen(rect, Vec2::new(-1.0, 1.0)), rect.left_top());
        assert_eq!(to_screen(rect, Vec2::new(1.0, -1.0)), rect.right_bottom());
        assert_eq!(to_screen(rect, Vec2::ZERO), rect.center());
    }

    #[test]
    fn stride_caps_painted_points() {
        assert_eq!(sample_stride(1000, 20_000), 1);
        assert_eq!(sample_stride(1_000_000, 20_000), 50);
        assert_eq!(sample_stride(20_001, 20_000), 2);
        assert_eq!(sample_stride(0, 20_000), 1);
    }

    #[test]
    fn additive_colour_has_zero_alpha() {
        let c = to_color([1.0, 0.5, 0.0], 1.0, Blending::Additive);
        assert_eq!(c.a(), 0);
        assert_eq!(c.r(), 255);
        let n = to_color([1.0, 1.0, 1.0], 0.5, Blending::Normal);
        assert_eq!(n.a(), 127);
    }
}

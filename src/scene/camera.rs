//! Perspective camera

use glam::{Mat4, Vec2, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached projection after changing fov/aspect/near/far.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Project a world-space point to NDC. Returns the NDC position and the
    /// view-space distance, or `None` when the point is behind the camera.
    pub fn project(&self, world: Vec3) -> Option<(Vec2, f32)> {
        let view = self.view_matrix().transform_point3(world);
        let depth = -view.z;
        if depth <= self.near {
            return None;
        }
        let clip = self.projection * view.extend(1.0);
        Some((Vec2::new(clip.x / clip.w, clip.y / clip.w), depth))
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(75.0, 1.0, 0.1, 1000.0)
    }
}

//! Orbit controls with optional damping
//!
//! Pointer drags and scroll are queued as deltas. Each `update()` applies
//! them to the yaw/pitch/distance state: in full when damping is off, or a
//! `damping_factor` share of the remainder when it is on, so motion eases out
//! over the following frames. `update()` must run once per frame.

use std::f32::consts::PI;

use glam::Vec3;

use super::PerspectiveCamera;

pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;

const PITCH_LIMIT: f32 = PI / 2.0 - 0.01;
const EPSILON: f32 = 1e-6;
const MOVE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    distance: f32,
    yaw: f32,
    pitch: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
}

impl OrbitControls {
    /// Derive orbit state from the camera's current position around its target.
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        let offset = camera.position - camera.target;
        let distance = offset.length().max(EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self {
            target: camera.target,
            enable_damping: true,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            rotate_speed: 0.005,
            zoom_speed: 0.001,
            min_distance: 0.1,
            max_distance: 1000.0,
            distance,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Queue a drag of `dx`, `dy` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_yaw -= dx * self.rotate_speed;
        self.pending_pitch += dy * self.rotate_speed;
    }

    /// Queue a scroll; positive values zoom in.
    pub fn zoom(&mut self, scroll: f32) {
        self.pending_zoom -= scroll * self.zoom_speed;
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw.abs() < EPSILON
            && self.pending_pitch.abs() < EPSILON
            && self.pending_zoom.abs() < EPSILON
    }

    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Advance queued motion and write the result into `camera`.
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let share = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        let d_yaw = self.pending_yaw * share;
        let d_pitch = self.pending_pitch * share;
        let d_zoom = self.pending_zoom * share;

        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = (self.distance * d_zoom.exp()).clamp(self.min_distance, self.max_distance);

        self.pending_yaw -= d_yaw;
        self.pending_pitch -= d_pitch;
        self.pending_zoom -= d_zoom;
        if self.is_settled() {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            self.pending_zoom = 0.0;
        }

        let eye = self.eye();
        let moved = eye.distance(camera.position) > MOVE_EPSILON || camera.target != self.target;
        camera.position = eye;
        camera.target = self.target;
        moved
    }
}

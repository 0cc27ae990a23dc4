//! Point rendering
//!
//! Two [`RenderTarget`](crate::frame::RenderTarget) implementations share the
//! helpers here: the wgpu instanced renderer drawn through an egui paint
//! callback, and a CPU fallback that paints circles with the egui painter.

mod cpu;
mod renderer;

pub use cpu::CpuTarget;
pub use renderer::{GalaxyCallback, GalaxyRenderer, GpuTarget};

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::frame::Frame;
use crate::galaxy::PointSet;
use crate::params::COUNT_RANGE;
use crate::scene::PointsMaterial;
use crate::sparkles::SparklePool;

/// Galaxy instance buffer size: the largest count the panel allows.
pub const GALAXY_CAPACITY: usize = COUNT_RANGE.max as usize;

/// Sparkles are drawn larger than galaxy points.
pub const SPARKLE_SIZE_SCALE: f32 = 2.5;

/// One instanced point: world position plus opacity.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuPoint {
    pub position: [f32; 3],
    pub alpha: f32,
}

/// Per-layer uniforms. Layout matches `Uniforms` in shader.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Render target size in physical pixels
    pub viewport: [f32; 2],
    pub point_size: f32,
    /// 1.0 when point size is in world units, 0.0 for pixels
    pub size_attenuation: f32,
}

impl Default for PointUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
            viewport: [1.0, 1.0],
            point_size: 1.0,
            size_attenuation: 0.0,
        }
    }
}

impl PointUniforms {
    pub fn new(
        frame: &Frame<'_>,
        model: Mat4,
        material: &PointsMaterial,
        viewport: [f32; 2],
    ) -> Self {
        let [r, g, b] = shade(material.color, frame.scene.ambient());
        Self {
            model: model.to_cols_array_2d(),
            view: frame.camera.view_matrix().to_cols_array_2d(),
            proj: frame.camera.projection_matrix().to_cols_array_2d(),
            color: [r, g, b, 1.0],
            viewport,
            point_size: material.size,
            size_attenuation: if material.size_attenuation { 1.0 } else { 0.0 },
        }
    }
}

/// Point colour lit by the summed ambient radiance.
pub fn shade(color: [f32; 3], ambient: [f32; 3]) -> [f32; 3] {
    [
        color[0] * ambient[0],
        color[1] * ambient[1],
        color[2] * ambient[2],
    ]
}

/// On-screen diameter in pixels of a world-sized point at view distance
/// `depth`; matches the shader's attenuation.
pub fn attenuated_size(size: f32, viewport_height: f32, depth: f32) -> f32 {
    size * viewport_height * 0.5 / depth.max(f32::EPSILON)
}

pub fn galaxy_instances(points: &PointSet) -> Vec<GpuPoint> {
    points
        .positions()
        .chunks_exact(3)
        .take(GALAXY_CAPACITY)
        .map(|p| GpuPoint {
            position: [p[0], p[1], p[2]],
            alpha: 1.0,
        })
        .collect()
}

/// Live sparkles with their current fade as alpha.
pub fn sparkle_instances(pool: &SparklePool, now: f32) -> Vec<GpuPoint> {
    pool.active(now)
        .map(|s| GpuPoint {
            position: s.position,
            alpha: s.fade(now),
        })
        .collect()
}

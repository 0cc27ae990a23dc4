//! Procedural galaxy generator
//!
//! Samples a cloud of points uniformly inside a cube centred on the origin
//! and swaps it into the scene, replacing the previous cloud.

use std::sync::Arc;

use glam::Vec3;
use rand::Rng;
use tracing::info;

use crate::params::GalaxyParams;
use crate::scene::{Blending, ObjectId, ObjectKind, PointCloud, PointsMaterial, Scene, SceneObject};
use crate::time::now_seconds;

/// Edge length of the sampling cube
pub const SPREAD: f32 = 3.0;
/// Every coordinate lies in `[-HALF_EXTENT, HALF_EXTENT]`
pub const HALF_EXTENT: f32 = SPREAD / 2.0;

pub const GALAXY_NAME: &str = "galaxy";

/// Flat xyz buffer; always three scalars per point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    positions: Vec<f32>,
}

impl PointSet {
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Number of points (not scalars)
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
    }
}

/// Sample a uniformly random coordinate in `[-HALF_EXTENT, HALF_EXTENT)`.
pub fn sample_coordinate<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    (rng.gen::<f32>() - 0.5) * SPREAD
}

pub fn generate_points<R: Rng + ?Sized>(count: usize, rng: &mut R) -> PointSet {
    let mut positions = vec![0.0f32; count * 3];
    for c in positions.iter_mut() {
        *c = sample_coordinate(rng);
    }
    PointSet { positions }
}

pub fn material_for(params: &GalaxyParams) -> PointsMaterial {
    PointsMaterial {
        size: params.size(),
        color: params.color().to_f32(),
        size_attenuation: true,
        depth_write: false,
        blending: Blending::Additive,
    }
}

/// Outcome of a regeneration: the detached handle (if any) and its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regenerated {
    pub previous: Option<ObjectId>,
    pub current: ObjectId,
    pub generation: u64,
}

/// Owns the handle of the one point cloud it keeps attached to the scene.
#[derive(Debug, Default)]
pub struct GalaxyGenerator {
    handle: Option<ObjectId>,
    generation: u64,
}

impl GalaxyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Option<ObjectId> {
        self.handle
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Build a fresh point cloud from `params`, detach the old one and attach
    /// the new one. The new cloud inherits the old cloud's transform.
    pub fn regenerate<R: Rng + ?Sized>(
        &mut self,
        scene: &mut Scene,
        params: &GalaxyParams,
        rng: &mut R,
    ) -> Regenerated {
        let started = now_seconds();
        let points = generate_points(params.count() as usize, rng);

        let previous = self.handle.take();
        let transform = previous
            .and_then(|id| scene.remove(id))
            .map(|old| old.transform)
            .unwrap_or_default();

        self.generation += 1;
        let cloud = PointCloud {
            geometry: Arc::new(points),
            material: material_for(params),
            generation: self.generation,
        };
        let current = scene.add(
            SceneObject::new(GALAXY_NAME, ObjectKind::Points(cloud)).with_transform(transform),
        );
        self.handle = Some(current);

        info!(
            count = params.count(),
            size = params.size(),
            generation = self.generation,
            elapsed_ms = format!("{:.1}", (now_seconds() - started) * 1000.0),
            "galaxy generated"
        );

        Regenerated {
            previous,
            current,
            generation: self.generation,
        }
    }

    /// Push colour changes onto the live material without rebuilding geometry.
    pub fn sync_material(&self, scene: &mut Scene, params: &GalaxyParams) {
        let Some(cloud) = self
            .handle
            .and_then(|id| scene.get_mut(id))
            .and_then(|o| o.as_points_mut())
        else {
            return;
        };
        cloud.material.color = params.color().to_f32();
    }
}

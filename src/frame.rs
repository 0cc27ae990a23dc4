//! Frame driver
//!
//! One `tick` per display refresh: sample the clock, advance the orbit
//! controls, apply the time-parameterized animations, advance the sparkle
//! pool, then hand the finished frame to a [`RenderTarget`]. All updates for
//! a tick happen before that tick's render call.

use glam::Vec3;
use rand::Rng;
use tracing::debug;

use crate::params::GalaxyParams;
use crate::scene::{ObjectId, OrbitControls, PerspectiveCamera, Scene};
use crate::sparkles::SparklePool;
use crate::time::TimeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn write(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// Angular rate source for a spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rate {
    Fixed(f32),
    /// Read `rotation_rate` from the parameter store each tick
    RotationParam,
}

impl Rate {
    fn resolve(self, params: &GalaxyParams) -> f32 {
        match self {
            Rate::Fixed(r) => r,
            Rate::RotationParam => params.rotation_rate(),
        }
    }
}

/// Absolute, time-parameterized motion. Never accumulates across ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// rotation[axis] = rate * t
    Spin { axis: Axis, rate: Rate },
    /// position[axis] = base + amplitude * sin(t * frequency)
    Bob {
        axis: Axis,
        base: f32,
        amplitude: f32,
        frequency: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub target: ObjectId,
    pub motion: Motion,
}

/// Everything a render target sees for one frame.
pub struct Frame<'a> {
    pub index: u64,
    pub elapsed: f64,
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
    pub sparkles: &'a SparklePool,
}

pub trait RenderTarget {
    fn render(&mut self, frame: &Frame<'_>);
}

/// The mutable world a tick operates on.
pub struct TickInput<'a, R: Rng + ?Sized> {
    pub clock: &'a dyn TimeSource,
    pub params: &'a GalaxyParams,
    pub scene: &'a mut Scene,
    pub camera: &'a mut PerspectiveCamera,
    pub controls: &'a mut OrbitControls,
    pub sparkles: &'a mut SparklePool,
    pub rng: &'a mut R,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub index: u64,
    pub elapsed: f64,
    pub dt: f64,
    pub camera_moved: bool,
    pub spawned: usize,
    pub retired: usize,
}

#[derive(Debug, Default)]
pub struct FrameDriver {
    animations: Vec<Animation>,
    last_elapsed: Option<f64>,
    frames: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animate(&mut self, target: ObjectId, motion: Motion) {
        self.animations.push(Animation { target, motion });
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Point animations of a detached object at its replacement.
    pub fn retarget(&mut self, old: ObjectId, new: ObjectId) -> usize {
        let mut moved = 0;
        for anim in self.animations.iter_mut().filter(|a| a.target == old) {
            anim.target = new;
            moved += 1;
        }
        moved
    }

    /// Write every animated property for time `elapsed`. A pure function of
    /// `elapsed` and the rate parameters; targets missing from the scene are skipped.
    pub fn apply(&self, scene: &mut Scene, params: &GalaxyParams, elapsed: f64) {
        let t = elapsed as f32;
        for anim in &self.animations {
            let Some(object) = scene.get_mut(anim.target) else {
                continue;
            };
            match anim.motion {
                Motion::Spin { axis, rate } => {
                    axis.write(&mut object.transform.rotation, rate.resolve(params) * t);
                }
                Motion::Bob {
                    axis,
                    base,
                    amplitude,
                    frequency,
                } => {
                    axis.write(
                        &mut object.transform.position,
                        base + amplitude * (t * frequency).sin(),
                    );
                }
            }
        }
    }

    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        input: TickInput<'_, R>,
        target: &mut dyn RenderTarget,
    ) -> FrameStats {
        let TickInput {
            clock,
            params,
            scene,
            camera,
            controls,
            sparkles,
            rng,
        } = input;

        let elapsed = clock.elapsed();
        let dt = self
            .last_elapsed
            .map_or(0.0, |last| (elapsed - last).max(0.0));
        self.last_elapsed = Some(elapsed);

        controls.enable_damping = params.damping();
        let camera_moved = controls.update(camera);

        self.apply(scene, params, elapsed);

        let now = elapsed as f32;
        let retired = sparkles.retire(now);
        let spawned = if params.sparkles() {
            sparkles.spawn(
                now,
                dt as f32,
                params.sparkle_rate(),
                params.sparkle_lifetime(),
                rng,
            )
        } else {
            0
        };

        self.frames += 1;
        let index = self.frames;
        target.render(&Frame {
            index,
            elapsed,
            scene,
            camera,
            sparkles,
        });

        if index % 600 == 0 {
            debug!(
                frame = index,
                elapsed = format!("{:.1}", elapsed),
                sparkles = sparkles.len(),
                "frame driver"
            );
        }

        FrameStats {
            index,
            elapsed,
            dt,
            camera_moved,
            spawned,
            retired,
        }
    }
}

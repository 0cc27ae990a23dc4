//! Application context
//!
//! Single owner of the scene, camera, clock and parameter store. The egui
//! app and the tests drive everything through this value; no component
//! reaches for global state.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::frame::{Axis, FrameDriver, FrameStats, Motion, Rate, RenderTarget, TickInput};
use crate::galaxy::{GalaxyGenerator, Regenerated};
use crate::panel::{Field, PanelEffect, PanelState};
use crate::params::{GalaxyParams, ParamError, ParamValue};
use crate::resize::{ResizeHandler, Viewport};
use crate::scene::{
    AmbientLight, ObjectId, ObjectKind, OrbitControls, PerspectiveCamera, Scene, SceneObject,
};
use crate::sparkles::{SparklePool, DEFAULT_CAPACITY};
use crate::time::{Clock, TimeSource};

pub const CAMERA_FOV: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(1.0, 1.0, 3.0);

const AMBIENT_NAME: &str = "ambient";

pub struct GalaxyContext {
    params: GalaxyParams,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    clock: Box<dyn TimeSource>,
    generator: GalaxyGenerator,
    driver: FrameDriver,
    sparkles: SparklePool,
    resize: ResizeHandler,
    panel: PanelState,
    rng: SmallRng,
    light: ObjectId,
    last_stats: FrameStats,
}

impl GalaxyContext {
    /// Wall clock, entropy-seeded sampling.
    pub fn new(params: GalaxyParams) -> Self {
        Self::build(params, Box::new(Clock::new()), SmallRng::from_entropy())
    }

    /// Caller-supplied clock and a fixed seed, for reproducible runs.
    pub fn with_clock(params: GalaxyParams, clock: Box<dyn TimeSource>, seed: u64) -> Self {
        Self::build(params, clock, SmallRng::seed_from_u64(seed))
    }

    fn build(params: GalaxyParams, clock: Box<dyn TimeSource>, rng: SmallRng) -> Self {
        let params = match params.validate() {
            Ok(()) => params,
            Err(e) => {
                warn!(error = %e, "invalid parameters, using defaults");
                GalaxyParams::default()
            }
        };

        let mut camera = PerspectiveCamera::new(CAMERA_FOV, 1.0, CAMERA_NEAR, CAMERA_FAR);
        camera.position = CAMERA_POSITION;
        camera.look_at(Vec3::ZERO);
        let controls = OrbitControls::from_camera(&camera);

        let mut scene = Scene::new();
        let light = scene.add(SceneObject::new(
            AMBIENT_NAME,
            ObjectKind::AmbientLight(AmbientLight {
                color: params.light_color().to_f32(),
                intensity: params.ambient_intensity(),
            }),
        ));

        let mut ctx = Self {
            params,
            scene,
            camera,
            controls,
            clock,
            generator: GalaxyGenerator::new(),
            driver: FrameDriver::new(),
            sparkles: SparklePool::new(DEFAULT_CAPACITY),
            resize: ResizeHandler::new(),
            panel: PanelState::new(),
            rng,
            light,
            last_stats: FrameStats::default(),
        };

        let galaxy = ctx.regenerate().current;
        ctx.driver.animate(
            galaxy,
            Motion::Spin {
                axis: Axis::Y,
                rate: Rate::RotationParam,
            },
        );

        info!(objects = ctx.scene.len(), "scene ready");
        ctx
    }

    /// Rebuild the galaxy from the current parameters and keep animations
    /// pointed at the new cloud.
    pub fn regenerate(&mut self) -> Regenerated {
        let regen = self
            .generator
            .regenerate(&mut self.scene, &self.params, &mut self.rng);
        if let Some(previous) = regen.previous {
            self.driver.retarget(previous, regen.current);
        }
        regen
    }

    /// Route a panel edit; regenerates or syncs live objects as the field requires.
    pub fn edit(&mut self, field: Field, value: ParamValue) -> Result<PanelEffect, ParamError> {
        let effect = self.panel.edit(&mut self.params, field, value)?;
        self.apply_effect(effect);
        Ok(effect)
    }

    /// The drag or text edit on `field` finished.
    pub fn finish(&mut self, field: Field) -> Result<PanelEffect, ParamError> {
        let effect = self.panel.finish(&mut self.params, field)?;
        self.apply_effect(effect);
        Ok(effect)
    }

    fn apply_effect(&mut self, effect: PanelEffect) {
        match effect {
            PanelEffect::Applied(Field::Sparkles) if !self.params.sparkles() => {
                self.sparkles.clear();
            }
            PanelEffect::Applied(_) => self.sync_live_properties(),
            PanelEffect::Regenerate(_) => {
                self.regenerate();
            }
            PanelEffect::Unchanged | PanelEffect::Pending(_) => {}
        }
    }

    /// Push immediate-mode parameters onto live scene objects.
    pub fn sync_live_properties(&mut self) {
        if let Some(light) = self
            .scene
            .get_mut(self.light)
            .and_then(|o| o.as_ambient_light_mut())
        {
            light.color = self.params.light_color().to_f32();
            light.intensity = self.params.ambient_intensity();
        }
        self.generator.sync_material(&mut self.scene, &self.params);
    }

    /// Advance one frame and render it into `target`.
    pub fn tick(&mut self, target: &mut dyn RenderTarget) -> FrameStats {
        let stats = self.driver.tick(
            TickInput {
                clock: self.clock.as_ref(),
                params: &self.params,
                scene: &mut self.scene,
                camera: &mut self.camera,
                controls: &mut self.controls,
                sparkles: &mut self.sparkles,
                rng: &mut self.rng,
            },
            target,
        );
        self.last_stats = stats;
        stats
    }

    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> bool {
        self.resize
            .handle(width, height, device_pixel_ratio, &mut self.camera)
    }

    pub fn params(&self) -> &GalaxyParams {
        &self.params
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn sparkles(&self) -> &SparklePool {
        &self.sparkles
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.resize.viewport()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Handle of the attached galaxy cloud.
    pub fn galaxy(&self) -> Option<ObjectId> {
        self.generator.handle()
    }

    pub fn animations_target(&self, id: ObjectId) -> bool {
        self.driver.animations().iter().any(|a| a.target == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::params::Rgb;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Shared(Rc<Cell<f64>>);

    impl TimeSource for Shared {
        fn elapsed(&self) -> f64 {
            self.0.get()
        }
    }

    struct Nothing;

    impl RenderTarget for Nothing {
        fn render(&mut self, _frame: &Frame<'_>) {}
    }

    fn context() -> (GalaxyContext, Rc<Cell<f64>>) {
        let time = Rc::new(Cell::new(0.0));
        let ctx = GalaxyContext::with_clock(
            GalaxyParams::default(),
            Box::new(Shared(time.clone())),
            42,
        );
        (ctx, time)
    }

    #[test]
    fn setup_builds_light_and_galaxy() {
        let (ctx, _) = context();
        assert_eq!(ctx.scene().len(), 2);
        assert_eq!(ctx.scene().point_clouds().count(), 1);
        assert_eq!(ctx.scene().ambient(), [1.0, 1.0, 1.0]);
        assert_eq!(ctx.camera().position, CAMERA_POSITION);
        assert_eq!(ctx.camera().fov, CAMERA_FOV);
    }

    #[test]
    fn regenerate_retargets_spin() {
        let (mut ctx, time) = context();
        let before = ctx.galaxy().unwrap();
        let regen = ctx.regenerate();
        assert_ne!(regen.current, before);
        assert!(ctx.animations_target(regen.current));
        assert!(!ctx.animations_target(before));

        time.set(2.0);
        ctx.tick(&mut Nothing);
        let rotation = ctx.scene().get(regen.current).unwrap().transform.rotation.y;
        assert_relative_eq!(rotation, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn light_edits_sync_to_scene() {
        let (mut ctx, _) = context();
        ctx.edit(Field::AmbientIntensity, ParamValue::Number(0.5))
            .unwrap();
        ctx.edit(Field::LightColor, ParamValue::Color(Rgb([255, 0, 0])))
            .unwrap();
        assert_eq!(ctx.scene().ambient(), [0.5, 0.0, 0.0]);
    }

    #[test]
    fn size_change_regenerates_on_finish() {
        let (mut ctx, _) = context();
        let before = ctx.galaxy().unwrap();
        ctx.edit(Field::Size, ParamValue::Number(0.05)).unwrap();
        assert_eq!(ctx.galaxy(), Some(before));

        assert_eq!(
            ctx.finish(Field::Size).unwrap(),
            PanelEffect::Regenerate(Field::Size)
        );
        let after = ctx.galaxy().unwrap();
        assert_ne!(after, before);
        let cloud = ctx.scene().get(after).unwrap().as_points().unwrap();
        assert_relative_eq!(cloud.material.size, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn disabling_sparkles_clears_pool() {
        let (mut ctx, time) = context();
        ctx.tick(&mut Nothing);
        time.set(1.0);
        ctx.tick(&mut Nothing);
        assert!(!ctx.sparkles().is_empty());

        ctx.edit(Field::Sparkles, ParamValue::Bool(false)).unwrap();
        assert!(ctx.sparkles().is_empty());
        time.set(2.0);
        assert_eq!(ctx.tick(&mut Nothing).spawned, 0);
    }

    #[test]
    fn invalid_params_fall_back_to_defaults() {
        let params: GalaxyParams = serde_json::from_str(r#"{"count": 5}"#).unwrap();
        let ctx = GalaxyContext::with_clock(params, Box::new(Clock::starting_at(0.0)), 1);
        assert_eq!(ctx.params().count(), 1000);
    }
}

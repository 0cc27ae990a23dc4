//! End-to-end scenarios driven through the application context

use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;
use galaxy_playground::frame::{Frame, RenderTarget};
use galaxy_playground::galaxy::HALF_EXTENT;
use galaxy_playground::panel::{Field, PanelEffect};
use galaxy_playground::params::ParamValue;
use galaxy_playground::time::TimeSource;
use galaxy_playground::{GalaxyContext, GalaxyParams};

struct ManualClock(Rc<Cell<f64>>);

impl TimeSource for ManualClock {
    fn elapsed(&self) -> f64 {
        self.0.get()
    }
}

/// Captures what each render call saw.
#[derive(Default)]
struct Capture {
    frames: Vec<(u64, f64, f32, usize)>,
}

impl RenderTarget for Capture {
    fn render(&mut self, frame: &Frame<'_>) {
        let (rotation, coords) = frame
            .scene
            .point_clouds()
            .next()
            .map(|(_, object, cloud)| {
                (object.transform.rotation.y, cloud.geometry.positions().len())
            })
            .unwrap_or_default();
        self.frames.push((frame.index, frame.elapsed, rotation, coords));
    }
}

fn context() -> (GalaxyContext, Rc<Cell<f64>>) {
    let time = Rc::new(Cell::new(0.0));
    let ctx = GalaxyContext::with_clock(
        GalaxyParams::default(),
        Box::new(ManualClock(time.clone())),
        2024,
    );
    (ctx, time)
}

fn galaxy_coords(ctx: &GalaxyContext) -> Vec<f32> {
    let id = ctx.galaxy().expect("galaxy attached");
    ctx.scene()
        .get(id)
        .and_then(|o| o.as_points())
        .expect("galaxy is a point cloud")
        .geometry
        .positions()
        .to_vec()
}

#[test]
fn startup_generates_default_galaxy_in_bounds() {
    let (ctx, _) = context();
    assert_eq!(ctx.params().count(), 1000);
    assert_eq!(ctx.params().size(), 0.02);

    let coords = galaxy_coords(&ctx);
    assert_eq!(coords.len(), 3000);
    assert!(coords.iter().all(|c| (-HALF_EXTENT..=HALF_EXTENT).contains(c)));
}

#[test]
fn deferred_count_change_replaces_the_cloud() {
    let (mut ctx, _) = context();
    let original = ctx.galaxy().unwrap();

    // Dragging: nothing regenerates until the drag finishes
    for v in [800.0, 600.0, 500.0] {
        assert_eq!(
            ctx.edit(Field::Count, ParamValue::Number(v)).unwrap(),
            PanelEffect::Pending(Field::Count)
        );
    }
    assert_eq!(ctx.galaxy(), Some(original));
    assert_eq!(galaxy_coords(&ctx).len(), 3000);

    assert_eq!(
        ctx.finish(Field::Count).unwrap(),
        PanelEffect::Regenerate(Field::Count)
    );
    assert_eq!(ctx.scene().point_clouds().count(), 1);
    assert!(!ctx.scene().contains(original));
    assert_eq!(galaxy_coords(&ctx).len(), 1500);
}

#[test]
fn tick_at_pi_rotates_by_rate_times_time() {
    let (mut ctx, time) = context();
    let mut capture = Capture::default();

    time.set(3.1416);
    ctx.tick(&mut capture);

    let (index, elapsed, rotation, coords) = capture.frames[0];
    assert_eq!(index, 1);
    assert_eq!(elapsed, 3.1416);
    assert_eq!(coords, 3000);
    assert_relative_eq!(rotation, 0.31416, epsilon = 1e-5);
}

#[test]
fn rotation_is_independent_of_tick_history() {
    let (mut a, time_a) = context();
    let (mut b, time_b) = context();
    let mut capture_a = Capture::default();
    let mut capture_b = Capture::default();

    for t in [0.5, 1.0, 1.7, 2.0] {
        time_a.set(t);
        a.tick(&mut capture_a);
    }
    time_b.set(2.0);
    b.tick(&mut capture_b);

    let last_a = capture_a.frames.last().unwrap().2;
    let last_b = capture_b.frames.last().unwrap().2;
    assert_relative_eq!(last_a, 0.2, epsilon = 1e-6);
    assert_relative_eq!(last_a, last_b, epsilon = 1e-6);
}

#[test]
fn rotation_rate_edit_takes_effect_next_tick() {
    let (mut ctx, time) = context();
    let mut capture = Capture::default();

    ctx.edit(Field::RotationRate, ParamValue::Number(0.5))
        .unwrap();
    time.set(2.0);
    ctx.tick(&mut capture);
    assert_relative_eq!(capture.frames[0].2, 1.0, epsilon = 1e-6);
}

#[test]
fn spin_continues_across_regeneration() {
    let (mut ctx, time) = context();
    let mut capture = Capture::default();

    time.set(1.0);
    ctx.tick(&mut capture);
    ctx.regenerate();
    time.set(2.0);
    ctx.tick(&mut capture);

    assert_relative_eq!(capture.frames[1].2, 0.2, epsilon = 1e-6);
}

#[test]
fn resize_is_idempotent_end_to_end() {
    let (mut ctx, _) = context();
    assert!(ctx.resize(1280.0, 720.0, 3.0));
    let camera = ctx.camera().clone();
    let viewport = ctx.viewport();

    assert!(!ctx.resize(1280.0, 720.0, 3.0));
    assert_eq!(ctx.camera(), &camera);
    assert_eq!(ctx.viewport(), viewport);
    assert_eq!(viewport.unwrap().pixel_ratio, 2.0);
    assert_relative_eq!(camera.aspect, 1280.0 / 720.0);
}

#[test]
fn sparkle_pool_stays_bounded_over_long_run() {
    let (mut ctx, time) = context();
    ctx.edit(Field::SparkleRate, ParamValue::Number(500.0))
        .unwrap();
    ctx.edit(Field::SparkleLifetime, ParamValue::Number(5.0))
        .unwrap();
    let mut capture = Capture::default();

    for frame in 0..2000 {
        time.set(frame as f64 / 10.0);
        ctx.tick(&mut capture);
        assert!(ctx.sparkles().len() <= ctx.sparkles().capacity());
    }
    assert!(ctx.sparkles().total_spawned() > ctx.sparkles().capacity() as u64);
}

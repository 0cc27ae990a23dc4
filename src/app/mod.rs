//! Galaxy playground app
//!
//! The egui app that runs on both native and WASM platforms. It owns the
//! [`GalaxyContext`] and feeds it window size, pointer input and panel
//! edits before ticking the frame driver once per update.

mod diagnostics;
mod header;
mod panel;

use eframe::egui;
use tracing::{info, warn};

use crate::context::GalaxyContext;
use crate::params::GalaxyParams;
use crate::render::{CpuTarget, GalaxyRenderer, GpuTarget};
use crate::theme::{colors, minimal_visuals};

/// Galaxy playground app - runs on both native and WASM
pub struct GalaxyApp {
    pub(crate) galaxy: GalaxyContext,
    /// FPS counter
    pub(crate) fps_counter: header::FpsCounter,
    /// Recent frame times for the diagnostics plot
    pub(crate) frame_times: diagnostics::FrameTimes,
    /// Use CPU rendering (--use-cpu on native, fallback if no wgpu)
    pub(crate) use_cpu: bool,
    /// Generation of the galaxy cloud last uploaded to the GPU
    uploaded_generation: Option<u64>,
    /// Points painted by the CPU path last frame
    pub(crate) cpu_painted: usize,
    /// Show the debug panel
    pub(crate) show_panel: bool,
}

/// Register the GPU renderer. Returns false when wgpu is unavailable.
fn register_renderer(cc: &eframe::CreationContext<'_>) -> bool {
    let Some(render_state) = cc.wgpu_render_state.as_ref() else {
        return false;
    };
    let renderer = GalaxyRenderer::new(&render_state.device, render_state.target_format);
    render_state
        .renderer
        .write()
        .callback_resources
        .insert(renderer);
    true
}

impl GalaxyApp {
    pub fn new(cc: &eframe::CreationContext<'_>, params: GalaxyParams, use_cpu: bool) -> Self {
        cc.egui_ctx.set_visuals(minimal_visuals());

        let use_cpu = if use_cpu {
            true
        } else if register_renderer(cc) {
            false
        } else {
            warn!("no wgpu render state, falling back to CPU rendering");
            true
        };
        info!(use_cpu, "renderer selected");

        Self {
            galaxy: GalaxyContext::new(params),
            fps_counter: header::FpsCounter::new(),
            frame_times: diagnostics::FrameTimes::default(),
            use_cpu,
            uploaded_generation: None,
            cpu_painted: 0,
            show_panel: true,
        }
    }

    /// Allocate the viewport, route pointer input to the orbit controls and
    /// tick the frame driver into the selected render target.
    fn render_scene(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, egui::Sense::drag());
        let rect = response.rect;

        self.galaxy
            .resize(rect.width(), rect.height(), ui.ctx().pixels_per_point());

        if response.dragged() {
            let delta = response.drag_delta();
            self.galaxy.controls_mut().rotate(delta.x, delta.y);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.galaxy.controls_mut().zoom(scroll);
            }
        }

        let stats = if self.use_cpu {
            let mut target = CpuTarget::new(&painter, rect);
            let stats = self.galaxy.tick(&mut target);
            self.cpu_painted = target.painted;
            stats
        } else {
            let pixel_ratio = self.galaxy.viewport().map_or(1.0, |v| v.pixel_ratio);
            let mut target = GpuTarget {
                painter: &painter,
                rect,
                pixel_ratio,
                uploaded_generation: &mut self.uploaded_generation,
            };
            self.galaxy.tick(&mut target)
        };
        self.frame_times.record(stats.dt);
    }
}

impl eframe::App for GalaxyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Request continuous repaint; the frame driver has no stop condition
        ctx.request_repaint();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(4.0))
            .show(ctx, |ui| {
                self.render_header(ui);
            });

        // Debug panel (right, must be shown before CentralPanel)
        if self.show_panel {
            self.render_panel(ctx);
        }

        self.draw_diagnostics(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| {
                self.render_scene(ui);
            });
    }
}

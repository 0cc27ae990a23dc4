//! Diagnostics window: frame timing, point counts and viewport state

use std::collections::VecDeque;

use eframe::egui;
use crate::theme::colors;
use super::GalaxyApp;

const FRAME_HISTORY: usize = 240;

/// Format a count with human-readable suffix (1234 → "1234", 50000 → "50.0k")
fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 10_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Rolling frame durations in milliseconds.
#[derive(Debug, Default)]
pub struct FrameTimes {
    samples: VecDeque<f64>,
}

impl FrameTimes {
    pub fn record(&mut self, dt: f64) {
        // First tick reports zero
        if dt <= 0.0 {
            return;
        }
        if self.samples.len() >= FRAME_HISTORY {
            self.samples.pop_front();
        }
        self.samples.push_back(dt * 1000.0);
    }

    pub fn worst_ms(&self) -> f64 {
        self.samples.iter().copied().fold(0.0, f64::max)
    }

    fn points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &ms)| [i as f64, ms])
            .collect()
    }
}

impl GalaxyApp {
    pub(crate) fn draw_diagnostics(&self, ctx: &egui::Context) {
        use egui_plot::{Line, Plot, PlotPoints};

        let stats = self.galaxy.last_stats();
        let sparkles = self.galaxy.sparkles();
        let points = self
            .galaxy
            .galaxy()
            .and_then(|id| self.galaxy.scene().get(id))
            .and_then(|o| o.as_points())
            .map(|cloud| (cloud.geometry.len(), cloud.generation));

        let title = egui::RichText::new(if self.use_cpu { "● CPU" } else { "● GPU" })
            .color(colors::TEXT_SECONDARY);

        egui::Area::new(egui::Id::new("diagnostics_area"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(8.0, 36.0))
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 200))
                    .corner_radius(4.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.set_min_width(240.0);
                        let header = egui::CollapsingHeader::new(title)
                            .default_open(false);

                        header.show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(format!(
                                    "frame {} / {:.1}s",
                                    stats.index, stats.elapsed
                                ))
                                .color(colors::TEXT_SECONDARY),
                            );

                            if let Some((count, generation)) = points {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{} points (gen {})",
                                        format_count(count as u64),
                                        generation
                                    ))
                                    .color(colors::TEXT_MUTED),
                                );
                            }

                            if self.use_cpu {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{} painted",
                                        format_count(self.cpu_painted as u64)
                                    ))
                                    .color(colors::TEXT_MUTED),
                                );
                            }

                            ui.label(
                                egui::RichText::new(format!(
                                    "{}/{} sparkles, {} spawned",
                                    sparkles.len(),
                                    sparkles.capacity(),
                                    format_count(sparkles.total_spawned()),
                                ))
                                .color(colors::TEXT_MUTED),
                            );

                            if let Some(vp) = self.galaxy.viewport() {
                                let [w, h] = vp.physical_size();
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{}x{} @{:.1}x",
                                        w, h, vp.pixel_ratio
                                    ))
                                    .color(colors::TEXT_MUTED),
                                );
                            }

                            ui.label(
                                egui::RichText::new(format!(
                                    "worst frame {:.1} ms",
                                    self.frame_times.worst_ms()
                                ))
                                .color(colors::TEXT_MUTED),
                            );

                            Plot::new("frame_times")
                                .height(60.0)
                                .show_axes([false, true])
                                .show_grid(false)
                                .allow_zoom(false)
                                .allow_drag(false)
                                .allow_scroll(false)
                                .show_background(false)
                                .include_x(0.0)
                                .include_x(FRAME_HISTORY as f64)
                                .include_y(0.0)
                                .include_y(33.0)
                                .label_formatter(|_name, value| format!("{:.1} ms", value.y))
                                .show(ui, |plot_ui| {
                                    let color = egui::Color32::from_rgba_unmultiplied(
                                        255, 255, 255, 160,
                                    );
                                    plot_ui.line(
                                        Line::new(PlotPoints::from(self.frame_times.points()))
                                            .color(color)
                                            .width(1.0),
                                    );
                                });
                        });
                    });
            });
    }
}

//! Header bar with panel toggle and status

use std::collections::VecDeque;

use eframe::egui;
use crate::theme::colors;
use crate::time::now_seconds;
use super::GalaxyApp;

const FPS_WINDOW: usize = 60;

impl GalaxyApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        self.fps_counter.tick();

        let params = self.galaxy.params();
        let (points, sparkles) = (params.count(), self.galaxy.sparkles().len());

        ui.horizontal(|ui| {
            let panel_text = if self.show_panel { "Debug >>>" } else { "Debug <<<" };

            ui.label(egui::RichText::new("galaxy").color(colors::TEXT_PRIMARY));

            // RIGHT: toggle, then stats (right-to-left order)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(egui::RichText::new(panel_text)).clicked() {
                    self.show_panel = !self.show_panel;
                }

                ui.add_space(10.0);

                ui.label(
                    egui::RichText::new(format!("{} sparkles", sparkles))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{} points", points))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                        .color(colors::TEXT_SECONDARY),
                );
            });
        });
    }
}

/// FPS counter using platform-agnostic time
pub struct FpsCounter {
    frames: VecDeque<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(FPS_WINDOW + 1),
        }
    }

    pub fn tick(&mut self) {
        self.record(now_seconds());
    }

    fn record(&mut self, now: f64) {
        self.frames.push_back(now);
        if self.frames.len() > FPS_WINDOW {
            self.frames.pop_front();
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.front(), self.frames.back()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / elapsed
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

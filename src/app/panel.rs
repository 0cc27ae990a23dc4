//! Debug panel sidebar: sliders, colour pickers and toggles bound to the
//! parameter store

use eframe::egui;
use tracing::warn;

use crate::panel::{ChangePolicy, Field};
use crate::params::{ParamValue, Rgb, COUNT_RANGE};
use crate::theme::colors;
use super::GalaxyApp;

impl GalaxyApp {
    pub(crate) fn render_panel(&mut self, ctx: &egui::Context) {
        let width = ctx.screen_rect().width() * 0.18;
        egui::SidePanel::right("debug_panel")
            .default_width(width)
            .min_width(240.0)
            .resizable(true)
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(8.0))
            .show(ctx, |ui| {
                let group_frame = egui::Frame::new()
                    .stroke(egui::Stroke::new(1.0, colors::TEXT_MUTED.gamma_multiply(0.6)))
                    .corner_radius(4.0)
                    .inner_margin(6.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("Galaxy:").color(colors::TEXT_MUTED));
                    for &field in &[Field::Count, Field::Size, Field::Color, Field::RotationRate] {
                        self.field_widget(ui, field);
                    }
                    if ui.button("Regenerate").clicked() {
                        self.galaxy.regenerate();
                    }
                });

                ui.add_space(8.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("Light:").color(colors::TEXT_MUTED));
                    for &field in &[Field::LightColor, Field::AmbientIntensity] {
                        self.field_widget(ui, field);
                    }
                });

                ui.add_space(8.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("Sparkles:").color(colors::TEXT_MUTED));
                    for &field in &[Field::Sparkles, Field::SparkleRate, Field::SparkleLifetime] {
                        self.field_widget(ui, field);
                    }
                });

                ui.add_space(8.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("Camera:").color(colors::TEXT_MUTED));
                    self.field_widget(ui, Field::Damping);
                });
            });
    }

    /// Draw the widget for one field and route its interaction.
    fn field_widget(&mut self, ui: &mut egui::Ui, field: Field) {
        let value = match self.galaxy.panel().display_value(self.galaxy.params(), field) {
            Ok(value) => value,
            Err(e) => {
                warn!(field = field.key(), error = %e, "panel read failed");
                return;
            }
        };

        match value {
            ParamValue::Number(mut v) => {
                let Some(range) = field.range() else {
                    return;
                };
                ui.label(egui::RichText::new(field.label()).color(colors::TEXT_SECONDARY));
                let slider_width = (ui.available_width() - 60.0).max(80.0);
                ui.spacing_mut().slider_width = slider_width;
                let response = ui.add(
                    egui::Slider::new(&mut v, range.min..=range.max)
                        .step_by(range.step)
                        .logarithmic(range == COUNT_RANGE)
                        .clamping(egui::SliderClamping::Always),
                );
                if response.changed() {
                    self.route_edit(field, ParamValue::Number(v));
                }
                if field.policy() == ChangePolicy::OnFinish
                    && (response.drag_stopped()
                        || response.lost_focus()
                        || (response.changed() && !response.dragged()))
                {
                    self.route_finish(field);
                }
            }
            ParamValue::Color(Rgb(mut rgb)) => {
                ui.horizontal(|ui| {
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        self.route_edit(field, ParamValue::Color(Rgb(rgb)));
                    }
                    ui.label(egui::RichText::new(field.label()).color(colors::TEXT_SECONDARY));
                });
            }
            ParamValue::Bool(mut on) => {
                if ui
                    .checkbox(
                        &mut on,
                        egui::RichText::new(field.label()).color(colors::TEXT_PRIMARY),
                    )
                    .changed()
                {
                    self.route_edit(field, ParamValue::Bool(on));
                }
            }
        }
    }

    fn route_edit(&mut self, field: Field, value: ParamValue) {
        if let Err(e) = self.galaxy.edit(field, value) {
            warn!(field = field.key(), error = %e, "panel edit rejected");
        }
    }

    fn route_finish(&mut self, field: Field) {
        if let Err(e) = self.galaxy.finish(field) {
            warn!(field = field.key(), error = %e, "panel commit rejected");
        }
    }
}

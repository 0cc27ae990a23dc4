//! Night-sky theme: near-black backgrounds so additive points read well

use egui::Color32;

/// Dark blue-black palette
pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(4, 5, 10);       // #04050A - scene clear
    pub const BG_ELEVATED: Color32 = Color32::from_rgb(14, 16, 26);    // #0E101A - panels
    pub const BG_HOVER: Color32 = Color32::from_rgb(28, 32, 48);       // #1C2030 - hover/active

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(235, 238, 255);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(150, 156, 184);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(84, 90, 116);

    pub const BORDER: Color32 = Color32::from_rgb(36, 40, 58);
}

/// egui Visuals for the playground
pub fn minimal_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_ELEVATED;
    visuals.extreme_bg_color = BG_PRIMARY;
    visuals.faint_bg_color = BG_ELEVATED;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_PRIMARY;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_ELEVATED;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.weak_bg_fill = BG_ELEVATED;

    visuals.widgets.hovered.bg_fill = BG_HOVER;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.hovered.weak_bg_fill = BG_HOVER;

    visuals.widgets.active.bg_fill = BG_HOVER;
    visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.active.weak_bg_fill = BG_HOVER;

    visuals.selection.bg_fill = Color32::from_rgb(52, 60, 96);
    visuals.selection.stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);

    visuals.hyperlink_color = TEXT_PRIMARY;

    // Flat: no shadows over the scene
    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}

//! Debug panel bindings
//!
//! UI-independent half of the debug panel. Each field has a change policy:
//! immediate fields write through their setter on every edit, deferred
//! fields hold the edited value until the interaction finishes and then ask
//! for a regeneration. The egui widgets in `app::panel` feed this.

use crate::params::{
    GalaxyParams, ParamError, ParamValue, Range, COUNT_RANGE, INTENSITY_RANGE, ROTATION_RANGE,
    SIZE_RANGE, SPARKLE_LIFETIME_RANGE, SPARKLE_RATE_RANGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Count,
    Size,
    Color,
    LightColor,
    AmbientIntensity,
    RotationRate,
    Sparkles,
    SparkleRate,
    SparkleLifetime,
    Damping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangePolicy {
    /// Apply on every change
    Immediate,
    /// Apply once the drag/edit finishes, then regenerate
    OnFinish,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Count,
        Field::Size,
        Field::Color,
        Field::LightColor,
        Field::AmbientIntensity,
        Field::RotationRate,
        Field::Sparkles,
        Field::SparkleRate,
        Field::SparkleLifetime,
        Field::Damping,
    ];

    /// Parameter store key
    pub fn key(self) -> &'static str {
        match self {
            Field::Count => "count",
            Field::Size => "size",
            Field::Color => "color",
            Field::LightColor => "light_color",
            Field::AmbientIntensity => "ambient_intensity",
            Field::RotationRate => "rotation_rate",
            Field::Sparkles => "sparkles",
            Field::SparkleRate => "sparkle_rate",
            Field::SparkleLifetime => "sparkle_lifetime",
            Field::Damping => "damping",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Count => "count",
            Field::Size => "size",
            Field::Color => "color",
            Field::LightColor => "light color",
            Field::AmbientIntensity => "A intensity",
            Field::RotationRate => "rotation",
            Field::Sparkles => "sparkles",
            Field::SparkleRate => "sparkle rate",
            Field::SparkleLifetime => "sparkle life",
            Field::Damping => "damping",
        }
    }

    pub fn policy(self) -> ChangePolicy {
        match self {
            Field::Count | Field::Size => ChangePolicy::OnFinish,
            _ => ChangePolicy::Immediate,
        }
    }

    pub fn range(self) -> Option<Range> {
        match self {
            Field::Count => Some(COUNT_RANGE),
            Field::Size => Some(SIZE_RANGE),
            Field::AmbientIntensity => Some(INTENSITY_RANGE),
            Field::RotationRate => Some(ROTATION_RANGE),
            Field::SparkleRate => Some(SPARKLE_RATE_RANGE),
            Field::SparkleLifetime => Some(SPARKLE_LIFETIME_RANGE),
            Field::Color | Field::LightColor | Field::Sparkles | Field::Damping => None,
        }
    }

    /// Clamp and step-snap numeric values; others pass through.
    pub fn constrain(self, value: ParamValue) -> ParamValue {
        match (value, self.range()) {
            (ParamValue::Number(v), Some(range)) => ParamValue::Number(range.clamp_snap(v)),
            _ => value,
        }
    }

    /// Whether `value` is what the store already holds for this field.
    fn matches(self, stored: ParamValue, value: ParamValue) -> bool {
        match (stored, value, self.range()) {
            (ParamValue::Number(a), ParamValue::Number(b), Some(range)) => range.same(a, b),
            _ => stored == value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEffect {
    Unchanged,
    /// Written to the parameter store; live objects need syncing
    Applied(Field),
    /// Held until the interaction finishes
    Pending(Field),
    /// Committed deferred value; the galaxy must be regenerated
    Regenerate(Field),
}

#[derive(Debug, Default)]
pub struct PanelState {
    pending: Vec<(Field, ParamValue)>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an interactive change through the field's policy.
    pub fn edit(
        &mut self,
        params: &mut GalaxyParams,
        field: Field,
        value: ParamValue,
    ) -> Result<PanelEffect, ParamError> {
        let value = field.constrain(value);
        match field.policy() {
            ChangePolicy::Immediate => {
                if field.matches(params.get(field.key())?, value) {
                    return Ok(PanelEffect::Unchanged);
                }
                params.set(field.key(), value)?;
                Ok(PanelEffect::Applied(field))
            }
            ChangePolicy::OnFinish => {
                self.pending.retain(|(f, _)| *f != field);
                self.pending.push((field, value));
                Ok(PanelEffect::Pending(field))
            }
        }
    }

    /// The interaction on `field` finished: commit its pending value.
    pub fn finish(
        &mut self,
        params: &mut GalaxyParams,
        field: Field,
    ) -> Result<PanelEffect, ParamError> {
        let Some(idx) = self.pending.iter().position(|(f, _)| *f == field) else {
            return Ok(PanelEffect::Unchanged);
        };
        let (_, value) = self.pending.remove(idx);
        if field.matches(params.get(field.key())?, value) {
            return Ok(PanelEffect::Unchanged);
        }
        params.set(field.key(), value)?;
        Ok(PanelEffect::Regenerate(field))
    }

    pub fn pending(&self, field: Field) -> Option<ParamValue> {
        self.pending
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| *v)
    }

    /// What the widget should show: the pending edit if any, else the stored value.
    pub fn display_value(
        &self,
        params: &GalaxyParams,
        field: Field,
    ) -> Result<ParamValue, ParamError> {
        match self.pending(field) {
            Some(v) => Ok(v),
            None => params.get(field.key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Rgb, NAMES};

    #[test]
    fn every_field_maps_to_a_parameter() {
        assert_eq!(Field::ALL.len(), NAMES.len());
        for field in Field::ALL {
            assert!(NAMES.contains(&field.key()));
        }
    }

    #[test]
    fn immediate_field_writes_through() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();
        let effect = panel
            .edit(&mut params, Field::AmbientIntensity, ParamValue::Number(0.5))
            .unwrap();
        assert_eq!(effect, PanelEffect::Applied(Field::AmbientIntensity));
        assert_eq!(params.ambient_intensity(), 0.5);
    }

    #[test]
    fn immediate_field_clamps_before_setting() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();
        panel
            .edit(&mut params, Field::AmbientIntensity, ParamValue::Number(9.0))
            .unwrap();
        assert_eq!(params.ambient_intensity(), 2.0);
    }

    #[test]
    fn unchanged_value_is_a_no_op() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();
        let effect = panel
            .edit(&mut params, Field::Color, ParamValue::Color(Rgb::WHITE))
            .unwrap();
        assert_eq!(effect, PanelEffect::Unchanged);
    }

    #[test]
    fn deferred_field_waits_for_finish() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();

        for v in [900.0, 700.0, 512.0] {
            let effect = panel
                .edit(&mut params, Field::Count, ParamValue::Number(v))
                .unwrap();
            assert_eq!(effect, PanelEffect::Pending(Field::Count));
        }
        assert_eq!(params.count(), 1000, "store untouched while dragging");
        assert_eq!(
            panel.display_value(&params, Field::Count).unwrap(),
            ParamValue::Number(500.0)
        );

        let effect = panel.finish(&mut params, Field::Count).unwrap();
        assert_eq!(effect, PanelEffect::Regenerate(Field::Count));
        assert_eq!(params.count(), 500);
        assert!(panel.pending(Field::Count).is_none());
    }

    #[test]
    fn finish_without_edit_is_unchanged() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();
        assert_eq!(
            panel.finish(&mut params, Field::Size).unwrap(),
            PanelEffect::Unchanged
        );
    }

    #[test]
    fn finish_back_to_original_value_skips_regeneration() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();
        panel
            .edit(&mut params, Field::Count, ParamValue::Number(1000.0))
            .unwrap();
        assert_eq!(
            panel.finish(&mut params, Field::Count).unwrap(),
            PanelEffect::Unchanged
        );
    }

    #[test]
    fn finish_on_stored_size_skips_regeneration() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();
        panel
            .edit(&mut params, Field::Size, ParamValue::Number(0.02))
            .unwrap();
        assert_eq!(
            panel.finish(&mut params, Field::Size).unwrap(),
            PanelEffect::Unchanged
        );

        params.set_size(0.05).unwrap();
        panel
            .edit(&mut params, Field::Size, ParamValue::Number(0.05))
            .unwrap();
        assert_eq!(
            panel.finish(&mut params, Field::Size).unwrap(),
            PanelEffect::Unchanged
        );
    }

    #[test]
    fn immediate_edit_to_stored_rate_is_unchanged() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();
        let stored = params.rotation_rate() as f64;
        assert_eq!(
            panel
                .edit(&mut params, Field::RotationRate, ParamValue::Number(stored))
                .unwrap(),
            PanelEffect::Unchanged
        );
    }

    #[test]
    fn type_mismatch_is_reported() {
        let mut params = GalaxyParams::default();
        let mut panel = PanelState::new();
        assert!(panel
            .edit(&mut params, Field::Damping, ParamValue::Number(1.0))
            .is_err());
    }
}

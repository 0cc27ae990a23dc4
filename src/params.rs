//! Parameter store: the tunables shared by the debug panel, the galaxy
//! generator and the frame driver.
//!
//! Fields are private; every write goes through a setter that checks the
//! field's own range. Name-keyed access (`get`/`set`) exists for the panel
//! and for config overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive numeric range with a widget step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        // Tolerate f32 round-off and step-snapping noise
        let eps = self.step * 1e-3;
        value >= self.min - eps && value <= self.max + eps
    }

    /// Equal up to f32 storage round-off and snapping noise.
    pub fn same(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.step * 1e-3
    }

    /// Clamp into range, then snap to the nearest step counted from `min`.
    pub fn clamp_snap(&self, value: f64) -> f64 {
        let v = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return v;
        }
        let steps = ((v - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

pub const COUNT_RANGE: Range = Range::new(100.0, 1_000_000.0, 100.0);
pub const SIZE_RANGE: Range = Range::new(0.001, 0.1, 0.001);
pub const INTENSITY_RANGE: Range = Range::new(0.0, 2.0, 0.01);
pub const ROTATION_RANGE: Range = Range::new(-2.0, 2.0, 0.01);
pub const SPARKLE_RATE_RANGE: Range = Range::new(0.0, 500.0, 1.0);
pub const SPARKLE_LIFETIME_RANGE: Range = Range::new(0.1, 5.0, 0.1);

/// Parameter keys, in panel order.
pub const NAMES: &[&str] = &[
    "count",
    "size",
    "color",
    "light_color",
    "ambient_intensity",
    "rotation_rate",
    "sparkles",
    "sparkle_rate",
    "sparkle_lifetime",
    "damping",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    #[error("parameter `{name}` expects a {expected} value")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
    },
    #[error("parameter `{name}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("parameter `{name}` is not finite")]
    NotFinite { name: &'static str },
    #[error("invalid colour `{0}`, expected #RRGGBB")]
    InvalidColor(String),
}

/// 8-bit sRGB colour, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub fn from_hex(s: &str) -> Result<Self, ParamError> {
        let invalid = || ParamError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    pub fn to_f32(self) -> [f32; 3] {
        self.0.map(|c| c as f32 / 255.0)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParamError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

/// A single parameter value as seen by the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Color(Rgb),
    Bool(bool),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            ParamValue::Number(v) => Some(v),
            _ => None,
        }
    }
}

fn check(name: &'static str, value: f64, range: &Range) -> Result<f64, ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite { name });
    }
    if !range.contains(value) {
        return Err(ParamError::OutOfRange {
            name,
            value,
            min: range.min,
            max: range.max,
        });
    }
    Ok(value)
}

fn expect_number(name: &'static str, value: ParamValue) -> Result<f64, ParamError> {
    value.as_number().ok_or(ParamError::TypeMismatch {
        name,
        expected: "number",
    })
}

fn expect_color(name: &'static str, value: ParamValue) -> Result<Rgb, ParamError> {
    match value {
        ParamValue::Color(c) => Ok(c),
        _ => Err(ParamError::TypeMismatch {
            name,
            expected: "colour",
        }),
    }
}

fn expect_bool(name: &'static str, value: ParamValue) -> Result<bool, ParamError> {
    match value {
        ParamValue::Bool(b) => Ok(b),
        _ => Err(ParamError::TypeMismatch {
            name,
            expected: "boolean",
        }),
    }
}

/// The galaxy's parameter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyParams {
    count: u32,
    size: f32,
    color: Rgb,
    light_color: Rgb,
    ambient_intensity: f32,
    rotation_rate: f32,
    sparkles: bool,
    sparkle_rate: f32,
    sparkle_lifetime: f32,
    damping: bool,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            count: 1000,
            size: 0.02,
            color: Rgb::WHITE,
            light_color: Rgb::WHITE,
            ambient_intensity: 1.0,
            rotation_rate: 0.1,
            sparkles: true,
            sparkle_rate: 40.0,
            sparkle_lifetime: 1.5,
            damping: true,
        }
    }
}

impl GalaxyParams {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn light_color(&self) -> Rgb {
        self.light_color
    }

    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_intensity
    }

    pub fn rotation_rate(&self) -> f32 {
        self.rotation_rate
    }

    pub fn sparkles(&self) -> bool {
        self.sparkles
    }

    pub fn sparkle_rate(&self) -> f32 {
        self.sparkle_rate
    }

    pub fn sparkle_lifetime(&self) -> f32 {
        self.sparkle_lifetime
    }

    pub fn damping(&self) -> bool {
        self.damping
    }

    pub fn set_count(&mut self, count: u32) -> Result<(), ParamError> {
        check("count", count as f64, &COUNT_RANGE)?;
        self.count = count;
        Ok(())
    }

    pub fn set_size(&mut self, size: f32) -> Result<(), ParamError> {
        check("size", size as f64, &SIZE_RANGE)?;
        self.size = size;
        Ok(())
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn set_light_color(&mut self, color: Rgb) {
        self.light_color = color;
    }

    pub fn set_ambient_intensity(&mut self, intensity: f32) -> Result<(), ParamError> {
        check("ambient_intensity", intensity as f64, &INTENSITY_RANGE)?;
        self.ambient_intensity = intensity;
        Ok(())
    }

    pub fn set_rotation_rate(&mut self, rate: f32) -> Result<(), ParamError> {
        check("rotation_rate", rate as f64, &ROTATION_RANGE)?;
        self.rotation_rate = rate;
        Ok(())
    }

    pub fn set_sparkles(&mut self, enabled: bool) {
        self.sparkles = enabled;
    }

    pub fn set_sparkle_rate(&mut self, rate: f32) -> Result<(), ParamError> {
        check("sparkle_rate", rate as f64, &SPARKLE_RATE_RANGE)?;
        self.sparkle_rate = rate;
        Ok(())
    }

    pub fn set_sparkle_lifetime(&mut self, lifetime: f32) -> Result<(), ParamError> {
        check("sparkle_lifetime", lifetime as f64, &SPARKLE_LIFETIME_RANGE)?;
        self.sparkle_lifetime = lifetime;
        Ok(())
    }

    pub fn set_damping(&mut self, enabled: bool) {
        self.damping = enabled;
    }

    /// Read a parameter by key.
    pub fn get(&self, name: &str) -> Result<ParamValue, ParamError> {
        let value = match name {
            "count" => ParamValue::Number(self.count as f64),
            "size" => ParamValue::Number(self.size as f64),
            "color" => ParamValue::Color(self.color),
            "light_color" => ParamValue::Color(self.light_color),
            "ambient_intensity" => ParamValue::Number(self.ambient_intensity as f64),
            "rotation_rate" => ParamValue::Number(self.rotation_rate as f64),
            "sparkles" => ParamValue::Bool(self.sparkles),
            "sparkle_rate" => ParamValue::Number(self.sparkle_rate as f64),
            "sparkle_lifetime" => ParamValue::Number(self.sparkle_lifetime as f64),
            "damping" => ParamValue::Bool(self.damping),
            other => return Err(ParamError::UnknownParameter(other.to_string())),
        };
        Ok(value)
    }

    /// Write a parameter by key through its setter.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        match name {
            "count" => {
                let v = check("count", expect_number("count", value)?, &COUNT_RANGE)?;
                if v.fract() != 0.0 {
                    return Err(ParamError::TypeMismatch {
                        name: "count",
                        expected: "integer",
                    });
                }
                self.set_count(v as u32)
            }
            "size" => self.set_size(expect_number("size", value)? as f32),
            "color" => {
                self.set_color(expect_color("color", value)?);
                Ok(())
            }
            "light_color" => {
                self.set_light_color(expect_color("light_color", value)?);
                Ok(())
            }
            "ambient_intensity" => {
                self.set_ambient_intensity(expect_number("ambient_intensity", value)? as f32)
            }
            "rotation_rate" => {
                self.set_rotation_rate(expect_number("rotation_rate", value)? as f32)
            }
            "sparkles" => {
                self.set_sparkles(expect_bool("sparkles", value)?);
                Ok(())
            }
            "sparkle_rate" => self.set_sparkle_rate(expect_number("sparkle_rate", value)? as f32),
            "sparkle_lifetime" => {
                self.set_sparkle_lifetime(expect_number("sparkle_lifetime", value)? as f32)
            }
            "damping" => {
                self.set_damping(expect_bool("damping", value)?);
                Ok(())
            }
            other => Err(ParamError::UnknownParameter(other.to_string())),
        }
    }

    /// Re-run every setter check. Deserialized records bypass the setters.
    pub fn validate(&self) -> Result<(), ParamError> {
        let mut scratch = self.clone();
        for name in NAMES {
            let value = self.get(name)?;
            scratch.set(name, value)?;
        }
        Ok(())
    }
}

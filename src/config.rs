//! Initial parameter overrides
//!
//! Natively the record is read from the JSON file named by `GALAXY_CONFIG`;
//! in the browser from the `window.__galaxy_config` JSON string. Missing
//! keys keep their defaults. A rejected config is logged and ignored.

use thiserror::Error;
use tracing::{info, warn};

use crate::params::{GalaxyParams, ParamError};

/// Env var naming a JSON parameter file (native only)
pub const CONFIG_ENV: &str = "GALAXY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Parse and validate a JSON parameter record.
pub fn parse_params(json: &str) -> Result<GalaxyParams, ConfigError> {
    let params: GalaxyParams = serde_json::from_str(json)?;
    params.validate()?;
    Ok(params)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_params_from_path(path: &std::path::Path) -> Result<GalaxyParams, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_params(&json)
}

/// Resolve the starting parameter record for this platform.
#[cfg(not(target_arch = "wasm32"))]
pub fn initial_params() -> GalaxyParams {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return GalaxyParams::default();
    };
    match load_params_from_path(std::path::Path::new(&path)) {
        Ok(params) => {
            info!(path = %path, count = params.count(), "loaded parameter overrides");
            params
        }
        Err(e) => {
            warn!(path = %path, error = %e, "config rejected, using defaults");
            GalaxyParams::default()
        }
    }
}

/// Resolve the starting parameter record for this platform.
#[cfg(target_arch = "wasm32")]
pub fn initial_params() -> GalaxyParams {
    let Some(json) = js_sys::eval("window.__galaxy_config")
        .ok()
        .and_then(|v| v.as_string())
    else {
        return GalaxyParams::default();
    };
    match parse_params(&json) {
        Ok(params) => {
            info!(count = params.count(), "loaded parameter overrides");
            params
        }
        Err(e) => {
            warn!(error = %e, "config rejected, using defaults");
            GalaxyParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Rgb;

    #[test]
    fn parses_overrides() {
        let p = parse_params(r##"{"count": 5000, "size": 0.05, "light_color": "#00FF00"}"##)
            .unwrap();
        assert_eq!(p.count(), 5000);
        assert_eq!(p.size(), 0.05);
        assert_eq!(p.light_color(), Rgb([0, 255, 0]));
        assert_eq!(p.rotation_rate(), GalaxyParams::default().rotation_rate());
    }

    #[test]
    fn empty_object_is_defaults() {
        assert_eq!(parse_params("{}").unwrap(), GalaxyParams::default());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_params("{count:"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn rejects_bad_colour() {
        assert!(matches!(
            parse_params(r#"{"color": "red"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = parse_params(r#"{"size": 3.0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Param(ParamError::OutOfRange { name: "size", .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_params_from_path(std::path::Path::new("/nonexistent/galaxy.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

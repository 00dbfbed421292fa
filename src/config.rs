//! Configuration loading: YAML file, then environment overrides.
//!
//! Optional:
//! - `SITEPLAN_CONFIG`: YAML file holding an [`OverlayConfig`] (partial documents are fine)
//! - `SITEPLAN_FINE_TUNE_SCALE`, `SITEPLAN_FINE_TUNE_DX`, `SITEPLAN_FINE_TUNE_DY`,
//!   `SITEPLAN_FINE_TUNE_ROTATE_DEG`: override the matching fine-tune value

use std::path::Path;

use overlay::config::OverlayConfig;

use crate::CliError;

pub const ENV_FINE_TUNE_SCALE: &str = "SITEPLAN_FINE_TUNE_SCALE";
pub const ENV_FINE_TUNE_DX: &str = "SITEPLAN_FINE_TUNE_DX";
pub const ENV_FINE_TUNE_DY: &str = "SITEPLAN_FINE_TUNE_DY";
pub const ENV_FINE_TUNE_ROTATE_DEG: &str = "SITEPLAN_FINE_TUNE_ROTATE_DEG";

/// Read the config file (if any), apply env overrides, and validate.
pub async fn load(path: Option<&Path>) -> Result<OverlayConfig, CliError> {
    let mut cfg = match path {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
            parse_yaml(&text)?
        }
        None => OverlayConfig::default(),
    };
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

/// An empty document means "all defaults".
pub fn parse_yaml(text: &str) -> Result<OverlayConfig, CliError> {
    if text.trim().is_empty() {
        return Ok(OverlayConfig::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

pub fn apply_env_overrides(cfg: &mut OverlayConfig) {
    let ft = &mut cfg.fine_tune;
    for (key, slot) in [
        (ENV_FINE_TUNE_SCALE, &mut ft.scale),
        (ENV_FINE_TUNE_DX, &mut ft.dx),
        (ENV_FINE_TUNE_DY, &mut ft.dy),
        (ENV_FINE_TUNE_ROTATE_DEG, &mut ft.rotate_deg),
    ] {
        if let Some(value) = env_parse_f64(key) {
            *slot = value;
        }
    }
}

fn env_parse_f64(key: &str) -> Option<f64> {
    let Ok(raw) = std::env::var(key) else {
        return None;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring unparseable override");
            None
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

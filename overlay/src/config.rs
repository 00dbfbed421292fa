//! Static configuration, read once at startup.
//!
//! Every field has a default, so a partial YAML/JSON document only needs to
//! mention what it changes.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::align::FineTune;
use crate::consts::{BUTTON_ZOOM_STEP, CLICK_SLOP_PX, FILL_OPACITY, STROKE_OPACITY, WHEEL_ZOOM_RATE};
use crate::records::{SheetColumns, StatusKey};
use crate::viewport::ZoomLimits;

/// Rejected configuration values.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("fine-tune scale must be finite and positive, got {0}")]
    FineTuneScale(f64),

    #[error("fine-tune {field} must be finite")]
    FineTuneNotFinite { field: &'static str },

    #[error("zoom limits must satisfy 0 < min <= max, got {min}..={max}")]
    ZoomLimits { min: f64, max: f64 },

    #[error("click tolerance must be finite and non-negative, got {0}")]
    ClickTolerance(f64),

    #[error("{field} must be within 0..=1, got {value}")]
    Opacity { field: &'static str, value: f64 },
}

/// Fill colour per status class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusColors {
    pub available: String,
    pub reserved: String,
    pub unavailable: String,
    pub unknown: String,
}

impl Default for StatusColors {
    fn default() -> Self {
        Self {
            available: "#2ecc71".into(),
            reserved: "#f4b400".into(),
            unavailable: "#d93025".into(),
            unknown: "#9ea3a8".into(),
        }
    }
}

impl StatusColors {
    #[must_use]
    pub fn for_status(&self, key: StatusKey) -> &str {
        match key {
            StatusKey::Available => &self.available,
            StatusKey::Reserved => &self.reserved,
            StatusKey::Unavailable => &self.unavailable,
            StatusKey::Unknown => &self.unknown,
        }
    }
}

/// Shape stroke and fill styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    pub fill_opacity: f64,
    pub stroke: String,
    pub stroke_opacity: f64,
    pub stroke_width: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self { fill_opacity: FILL_OPACITY, stroke: "#000".into(), stroke_opacity: STROKE_OPACITY, stroke_width: 1.0 }
    }
}

/// Viewport input tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Log-zoom per wheel unit.
    pub wheel_rate: f64,
    /// Log-zoom per zoom-button press.
    pub button_step: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        let limits = ZoomLimits::default();
        Self { min_scale: limits.min, max_scale: limits.max, wheel_rate: WHEEL_ZOOM_RATE, button_step: BUTTON_ZOOM_STEP }
    }
}

impl ZoomConfig {
    #[must_use]
    pub fn limits(&self) -> ZoomLimits {
        ZoomLimits { min: self.min_scale, max: self.max_scale }
    }
}

/// The full configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub colors: StatusColors,
    pub style: ShapeStyle,
    pub fine_tune: FineTune,
    pub zoom: ZoomConfig,
    /// Pointer travel in screen pixels beyond which a press is a drag.
    pub click_tolerance_px: f64,
    pub columns: SheetColumns,
    /// Column whose value gets an ` m²` suffix in the detail panel.
    pub size_column: Option<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            colors: StatusColors::default(),
            style: ShapeStyle::default(),
            fine_tune: FineTune::IDENTITY,
            zoom: ZoomConfig::default(),
            click_tolerance_px: CLICK_SLOP_PX,
            columns: SheetColumns::default(),
            size_column: Some("Size".into()),
        }
    }
}

impl OverlayConfig {
    /// Check the values the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ft = &self.fine_tune;
        if !ft.scale.is_finite() || ft.scale <= 0.0 {
            return Err(ConfigError::FineTuneScale(ft.scale));
        }
        for (field, value) in [("dx", ft.dx), ("dy", ft.dy), ("rotate_deg", ft.rotate_deg)] {
            if !value.is_finite() {
                return Err(ConfigError::FineTuneNotFinite { field });
            }
        }

        let z = &self.zoom;
        let limits_ok = z.min_scale.is_finite() && z.max_scale.is_finite() && z.min_scale > 0.0 && z.min_scale <= z.max_scale;
        if !limits_ok {
            return Err(ConfigError::ZoomLimits { min: z.min_scale, max: z.max_scale });
        }

        if !self.click_tolerance_px.is_finite() || self.click_tolerance_px < 0.0 {
            return Err(ConfigError::ClickTolerance(self.click_tolerance_px));
        }

        for (field, value) in [("fill_opacity", self.style.fill_opacity), ("stroke_opacity", self.style.stroke_opacity)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Opacity { field, value });
            }
        }
        Ok(())
    }
}

//! Engine configuration.
//!
//! All fields have defaults, so a partial JSON object (or `{}`) is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::recent::DEFAULT_RECENT_CAPACITY;
use crate::style::Rgba;

/// Errors from loading or validating a [`CropConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What [`crate::CropSession::confirm`] does with a rectangle that extends
/// past the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfBoundsPolicy {
    /// Return the rectangle as resolved.
    #[default]
    Preserve,
    /// Shrink the square until it fits inside the image.
    Clamp,
    /// Fail with `GeometryError::OutOfBounds`.
    Reject,
}

/// Encoding of the exported logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Jpeg,
    #[default]
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Duration of the scale snap-back after a gesture ends below fit.
    pub snap_back_duration_ms: u64,
    /// Lower bound of the displayed zoom level.
    pub zoom_readout_min: f64,
    /// Upper bound of the displayed zoom level.
    pub zoom_readout_max: f64,
    /// Opacity of the dimmed surround (0.0 to 1.0).
    pub overlay_opacity: f32,
    /// Color of the dimmed surround.
    pub overlay_color: Rgba,
    /// Longest edge of the exported logo in pixels.
    pub output_max_edge: u32,
    /// JPEG quality (1-100), used when `output_format` is JPEG.
    pub jpeg_quality: u8,
    pub output_format: OutputFormat,
    /// Number of entries kept in the recent-image list.
    pub recent_capacity: usize,
    pub out_of_bounds: OutOfBoundsPolicy,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            snap_back_duration_ms: 300,
            zoom_readout_min: 1.0,
            zoom_readout_max: 10.0,
            overlay_opacity: 0.6,
            overlay_color: Rgba::BLACK,
            output_max_edge: 512,
            jpeg_quality: 90,
            output_format: OutputFormat::Png,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            out_of_bounds: OutOfBoundsPolicy::Preserve,
        }
    }
}

impl CropConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CropConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn snap_back_duration(&self) -> Duration {
        Duration::from_millis(self.snap_back_duration_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.zoom_readout_min > 0.0 && self.zoom_readout_min <= self.zoom_readout_max) {
            return Err(ConfigError::Invalid {
                field: "zoom_readout_min",
                reason: format!(
                    "must be positive and not above zoom_readout_max ({})",
                    self.zoom_readout_max
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(ConfigError::Invalid {
                field: "overlay_opacity",
                reason: format!("{} is outside 0.0..=1.0", self.overlay_opacity),
            });
        }
        if self.output_max_edge == 0 {
            return Err(ConfigError::Invalid {
                field: "output_max_edge",
                reason: "must be non-zero".to_string(),
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid {
                field: "jpeg_quality",
                reason: format!("{} is outside 1..=100", self.jpeg_quality),
            });
        }
        if self.recent_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "recent_capacity",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CropConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.snap_back_duration(), Duration::from_millis(300));
        assert_eq!(config.recent_capacity, 10);
    }

    #[test]
    fn test_from_json_partial() {
        let config = CropConfig::from_json(r#"{"output_max_edge": 256, "output_format": "jpeg"}"#).unwrap();
        assert_eq!(config.output_max_edge, 256);
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert_eq!(config.snap_back_duration_ms, 300);
    }

    #[test]
    fn test_from_json_empty_object() {
        let config = CropConfig::from_json("{}").unwrap();
        assert_eq!(config, CropConfig::default());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            CropConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CropConfig::default();
        config.overlay_opacity = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "overlay_opacity", .. })
        ));

        let mut config = CropConfig::default();
        config.zoom_readout_min = 20.0;
        assert!(config.validate().is_err());

        let mut config = CropConfig::default();
        config.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = CropConfig::default();
        config.recent_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_bounds_policy_serde() {
        let config = CropConfig::from_json(r#"{"out_of_bounds": "clamp"}"#).unwrap();
        assert_eq!(config.out_of_bounds, OutOfBoundsPolicy::Clamp);
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
    }
}

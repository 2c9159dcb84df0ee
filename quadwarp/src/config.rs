#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Containment;
#[cfg(feature = "serde")]
use crate::geometry::Quad;

/// Spacing of the verification grid, in source pixels.
pub const DEFAULT_GRID_SPACING: f64 = 20.0;

/// Semi-transparent blue used to stroke the grid overlay.
pub const DEFAULT_GRID_COLOR: [u8; 4] = [0, 150, 255, 128];

/// Warp configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WarpConfig {
    pub containment: Containment,
    pub grid_spacing: f64,
    pub grid_color: [u8; 4],
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            containment: Containment::BoundingBox,
            grid_spacing: DEFAULT_GRID_SPACING,
            grid_color: DEFAULT_GRID_COLOR,
        }
    }
}

/// A warp described in a TOML file:
///
/// ```toml
/// corners = [[0, 0], [640, 40], [600, 480], [20, 440]]
/// width = 640
/// height = 480
///
/// [warp]
/// containment = "polygon"
/// grid_spacing = 32.0
/// ```
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WarpJob {
    /// Destination corners: top-left, top-right, bottom-right, bottom-left.
    pub corners: Quad,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub warp: WarpConfig,
}

#[cfg(feature = "serde")]
impl WarpJob {
    /// Parse a job from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<WarpJob, ConfigError> {
        let job: WarpJob = toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if !(job.warp.grid_spacing.is_finite() && job.warp.grid_spacing > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid_spacing must be a positive number, got {}",
                job.warp.grid_spacing
            )));
        }
        if job.width == Some(0) || job.height == Some(0) {
            return Err(ConfigError::Invalid("output dimensions must be positive".into()));
        }
        Ok(job)
    }
}

#[cfg(feature = "serde")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

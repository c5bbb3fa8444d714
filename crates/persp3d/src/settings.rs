//! Scene-wide settings.

use serde::{Deserialize, Serialize};

use crate::error::{Persp3dError, Result};

/// Which analysis decides the painting order of box faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZOrderStrategy {
    /// Case analysis over the number of finite vanishing points.
    #[default]
    SectorHeuristics,
    /// Locate the reference corner relative to the triangle spanned by the
    /// three vanishing points. Only applies when all of them are finite;
    /// otherwise the sector heuristics are used.
    VanishingTriangle,
}

/// Parameters shared by every perspective and box in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Snap hysteresis band in screen pixels.
    pub snap_threshold: f64,
    /// Current zoom factor; multiplies screen distances in snap tests.
    pub zoom: f64,
    /// Document width in px, used to place the default perspective.
    pub document_width: f64,
    /// Document height in px, used to place the default perspective.
    pub document_height: f64,
    /// Face ordering analysis.
    pub z_order_strategy: ZOrderStrategy,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            snap_threshold: 30.0,
            zoom: 1.0,
            document_width: 744.09,
            document_height: 1052.36,
            z_order_strategy: ZOrderStrategy::SectorHeuristics,
        }
    }
}

impl SceneSettings {
    /// Parse from TOML; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Persp3dError::Settings(e.to_string()))
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.snap_threshold >= 0.0) || !self.snap_threshold.is_finite() {
            return Err(Persp3dError::Settings(
                "snap_threshold must be a non-negative number".into(),
            ));
        }
        if !(self.zoom > 0.0) || !self.zoom.is_finite() {
            return Err(Persp3dError::Settings("zoom must be positive".into()));
        }
        if !(self.document_width > 0.0)
            || !(self.document_height > 0.0)
            || !self.document_width.is_finite()
            || !self.document_height.is_finite()
        {
            return Err(Persp3dError::Settings(
                "document dimensions must be positive".into(),
            ));
        }
        Ok(())
    }
}

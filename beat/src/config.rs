//! Runtime switches for the game screen.
//!
//! Values are plain serde data so a launcher can persist them anywhere; the
//! strongly typed views (`viewport_kind`, `interpolation_override`) are
//! checked once by [`Config::validate`] when the screen is built.

use serde::{Deserialize, Serialize};

use crate::camera::ViewportKind;
use crate::error::ConfigError;
use crate::interpolation::InterpolationOverride;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// `CURRENT`, `DISABLED`, `LINEAR`, `ELASTIC`, `POW2` or `BOUNCE`.
    pub interpolation: String,
    /// Draw the screen transition overlay.
    pub shader: bool,
    /// Draw hitbox outlines.
    pub hitbox: bool,
    /// Draw sprites.
    pub sprites: bool,
    /// Spawn physics debris when bricks explode.
    pub box2d: bool,
    /// Draw position labels.
    pub position: bool,
    /// Draw direction arrows.
    pub direction: bool,
    pub particles: bool,
    /// `FitViewport`, `FillViewport`, `ExtendViewport`, `StretchViewport` or `ScreenViewport`.
    pub viewport: String,
    pub custom_font: bool,
    /// Sprite sheet used by the transition overlay.
    pub transitions: String,
    pub music: bool,
    pub sfx: bool,
    pub level: String,

    /// Upper bound on the frame delta fed to physics and gameplay, in seconds.
    pub max_delta: f32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    pub physics_substeps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpolation: "CURRENT".into(),
            shader: true,
            hitbox: false,
            sprites: true,
            box2d: true,
            position: false,
            direction: false,
            particles: true,
            viewport: "FitViewport".into(),
            custom_font: true,
            transitions: "sheets/transition2".into(),
            music: true,
            sfx: true,
            level: "level0".into(),
            max_delta: 1.0 / 60.0,
            velocity_iterations: 6,
            position_iterations: 2,
            physics_substeps: 1,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would only surface as bugs mid-game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport_kind()?;
        self.interpolation_override()?;
        if self.max_delta.is_nan() || self.max_delta <= 0.0 {
            return Err(ConfigError::InvalidMaxDelta(self.max_delta));
        }
        Ok(())
    }

    pub fn viewport_kind(&self) -> Result<ViewportKind, ConfigError> {
        self.viewport.parse()
    }

    pub fn interpolation_override(&self) -> Result<InterpolationOverride, ConfigError> {
        self.interpolation.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.viewport_kind().unwrap(), ViewportKind::Fit);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "hitbox": true, "viewport": "ExtendViewport" }"#).unwrap();
        assert!(config.hitbox);
        assert!(config.sprites);
        assert_eq!(config.viewport_kind().unwrap(), ViewportKind::Extend);
        assert_eq!(config.velocity_iterations, 6);
    }

    #[test]
    fn test_unknown_viewport_fails_fast() {
        let err = Config::from_json(r#"{ "viewport": "PanoramaViewport" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownViewport(ref v) if v == "PanoramaViewport"));
    }

    #[test]
    fn test_json_round_trip_uses_camel_case() {
        let json = Config::default().to_json().unwrap();
        assert!(json.contains("customFont"));
        assert!(json.contains("maxDelta"));
    }
}

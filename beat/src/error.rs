//! Typed errors raised while setting up a game screen.
//!
//! Runtime code never produces these: everything here is detected while the
//! configuration, level and assets are being loaded.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not a supported value for viewport")]
    UnknownViewport(String),
    #[error("{0} is not a supported interpolation override")]
    UnknownInterpolation(String),
    #[error("max_delta must be positive, got {0}")]
    InvalidMaxDelta(f32),
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("malformed level description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("object {index} of layer `{layer}` is missing property `{property}`")]
    MissingProperty {
        layer: String,
        index: usize,
        property: String,
    },
    #[error("property `{property}` of object {index} in layer `{layer}` is not {expected}")]
    InvalidProperty {
        layer: String,
        index: usize,
        property: String,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{0}` is unknown to the loader")]
    NotFound(String),
    #[error("sprite sheet `{sheet}` has no clip named `{clip}`")]
    MissingClip { sheet: String, clip: String },
    #[error("sprite sheet `{sheet}` has no slice named `{slice}`")]
    MissingSlice { sheet: String, slice: String },
    #[error("sprite sheet `{0}` has no frames")]
    EmptySheet(String),
}

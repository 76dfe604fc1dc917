//! Error types for sky construction and configuration

use thiserror::Error;

/// Result type for sky operations
pub type SkyResult<T> = Result<T, SkyError>;

/// Errors that can occur while building the sky.
///
/// Everything except [`SkyError::MissingRenderCapability`] and
/// [`SkyError::Config`] is a construction-time precondition violation; nothing
/// here is raised per frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkyError {
    #[error("Rendering capability unavailable: {0}")]
    MissingRenderCapability(String),

    #[error("Particle field must contain at least one particle")]
    EmptyField,

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Invalid bounds: min {min:?} exceeds max {max:?}")]
    InvalidBounds { min: [f32; 3], max: [f32; 3] },

    #[error("Invalid scale range: [{0}, {1}]")]
    InvalidScaleRange(f32, f32),

    #[error("Probability out of range: {0}")]
    InvalidProbability(f32),

    #[error("Invalid range for {name}: [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    #[error("Shooting-star pool must hold at least one actor")]
    EmptyPool,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SkyError {
    fn from(err: std::io::Error) -> Self {
        SkyError::Io(err.to_string())
    }
}

impl From<ron::error::SpannedError> for SkyError {
    fn from(err: ron::error::SpannedError) -> Self {
        SkyError::Config(err.to_string())
    }
}

impl From<ron::Error> for SkyError {
    fn from(err: ron::Error) -> Self {
        SkyError::Config(err.to_string())
    }
}

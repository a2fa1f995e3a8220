//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Bass-boost strength outside 0-1000
    #[error("Invalid bass strength: {0} (expected 0-1000)")]
    InvalidBassStrength(i32),

    /// Decode primitive failed to load, prepare or start a track
    #[error("Decoder error: {0}")]
    Decoder(String),

    /// Effect construction or parameter change failed
    #[error("Effect error: {0}")]
    Effect(String),

    /// Playback service has shut down
    #[error("Playback service is not running")]
    ServiceStopped,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Core error (catalog, stores)
    #[error(transparent)]
    Core(#[from] aura_core::AuraError),
}

impl PlaybackError {
    /// Create a decoder error
    pub fn decoder(msg: impl Into<String>) -> Self {
        Self::Decoder(msg.into())
    }

    /// Create an effect error
    pub fn effect(msg: impl Into<String>) -> Self {
        Self::Effect(msg.into())
    }
}

impl From<config::ConfigError> for PlaybackError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

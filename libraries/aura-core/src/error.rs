/// Core error types for Aura
use crate::types::TrackId;
use thiserror::Error;

/// Result type alias using `AuraError`
pub type Result<T> = std::result::Result<T, AuraError>;

/// Core error type for Aura
#[derive(Error, Debug)]
pub enum AuraError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Catalog query errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Track not found
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl AuraError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

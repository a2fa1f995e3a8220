/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Value out of the accepted range
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

impl From<StorageError> for aura_core::AuraError {
    fn from(err: StorageError) -> Self {
        aura_core::AuraError::storage(err.to_string())
    }
}

//! Playback settings
//!
//! Settings are stored as key-value pairs with JSON-serialized values.

use crate::error::{Result, StorageError};
use aura_core::MAX_BASS_STRENGTH;
use sqlx::SqlitePool;

/// Last bass-boost strength (0-1000)
pub const SETTING_BASS_STRENGTH: &str = "effects.bass_strength";

/// Get a single setting value
///
/// Returns `Ok(None)` if the setting was never written.
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<serde_json::Value>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM app_settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    match row {
        Some((raw,)) => {
            let value = serde_json::from_str(&raw)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Create or replace a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &serde_json::Value) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO app_settings (key, value, updated_at)
         VALUES (?, ?, ?)
         ON CONFLICT(key)
         DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(raw)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the persisted bass-boost strength
///
/// A stored value outside 0-1000 (or of the wrong type) is ignored.
pub async fn get_bass_strength(pool: &SqlitePool) -> Result<Option<u16>> {
    let Some(value) = get_setting(pool, SETTING_BASS_STRENGTH).await? else {
        return Ok(None);
    };

    let strength = value
        .as_u64()
        .and_then(|v| u16::try_from(v).ok())
        .filter(|v| *v <= MAX_BASS_STRENGTH);

    if strength.is_none() {
        tracing::warn!(%value, "Ignoring invalid persisted bass strength");
    }

    Ok(strength)
}

/// Persist the bass-boost strength
pub async fn set_bass_strength(pool: &SqlitePool, strength: u16) -> Result<()> {
    if strength > MAX_BASS_STRENGTH {
        return Err(StorageError::invalid_value(SETTING_BASS_STRENGTH, strength));
    }

    set_setting(pool, SETTING_BASS_STRENGTH, &serde_json::json!(strength)).await
}

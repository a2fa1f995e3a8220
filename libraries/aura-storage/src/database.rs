/// Database implementation
use crate::error::Result;
use crate::{play_counts, settings};
use async_trait::async_trait;
use aura_core::{PlayCountStore, SettingsStore, SongPlayCount, TrackId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// SQLite database holding play counts and playback settings
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    ///
    /// # Errors
    /// Returns an error if the connection fails or migrations fail
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Each in-memory connection is its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        crate::run_migrations(&pool).await?;

        tracing::debug!(url = database_url, "Database ready");

        Ok(Self { pool })
    }

    /// Create an in-memory database
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Create database from an existing pool (for testing)
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PlayCountStore for Database {
    async fn increment(&self, track_id: TrackId) -> aura_core::Result<()> {
        play_counts::increment(&self.pool, track_id).await?;
        Ok(())
    }

    async fn top_n(&self, limit: usize) -> aura_core::Result<Vec<SongPlayCount>> {
        Ok(play_counts::top_n(&self.pool, limit).await?)
    }
}

#[async_trait]
impl SettingsStore for Database {
    async fn bass_strength(&self) -> aura_core::Result<Option<u16>> {
        Ok(settings::get_bass_strength(&self.pool).await?)
    }

    async fn set_bass_strength(&self, strength: u16) -> aura_core::Result<()> {
        settings::set_bass_strength(&self.pool, strength).await?;
        Ok(())
    }
}

//! Aura Storage
//!
//! `SQLite` persistence for the state the playback core keeps across restarts:
//! per-track play counts (for the "top songs" recap) and the last bass-boost
//! strength.
//!
//! # Example
//!
//! ```rust,no_run
//! use aura_core::{PlayCountStore, SettingsStore, TrackId};
//! use aura_storage::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("sqlite://aura.db").await?;
//!
//! db.increment(TrackId::new(42)).await?;
//! db.set_bass_strength(400).await?;
//!
//! let top = db.top_n(5).await?;
//! # Ok(())
//! # }
//! ```

mod database;
mod error;

// Vertical slices
pub mod play_counts;
pub mod settings;

pub use database::Database;
pub use error::{Result, StorageError};

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply pending migrations
///
/// Applied versions are tracked in `_sqlx_migrations`, so reopening an
/// up-to-date database runs nothing.
///
/// # Errors
///
/// Returns an error if a migration fails or an applied one was modified
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

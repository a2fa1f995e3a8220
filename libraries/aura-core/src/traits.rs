/// Collaborator traits consumed by the playback core
use crate::error::Result;
use crate::types::{FolderFilter, SongPlayCount, Track, TrackId};
use async_trait::async_trait;

/// Track catalog
///
/// Enumerates playable tracks from an external content index. Called once per
/// "load library" action; the result is treated as an immutable snapshot.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// List playable tracks inside `filter`, sorted by title ascending
    ///
    /// An empty library is an empty vector, never an error.
    async fn list_tracks(&self, filter: &FolderFilter) -> Result<Vec<Track>>;
}

/// Persistent play-count store
///
/// Used to rank "top songs" for the recap screen. The playback core only ever
/// calls [`PlayCountStore::increment`], fire-and-forget, on natural completion.
#[async_trait]
pub trait PlayCountStore: Send + Sync {
    /// Record one completed play of `track_id`
    async fn increment(&self, track_id: TrackId) -> Result<()>;

    /// Get the `limit` most played tracks, highest count first
    async fn top_n(&self, limit: usize) -> Result<Vec<SongPlayCount>>;
}

/// Highest bass-boost strength the effect accepts
pub const MAX_BASS_STRENGTH: u16 = 1000;

/// Persisted playback settings
///
/// Holds the single value the playback core keeps across process restarts.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Last bass-boost strength (0-1000), if one was ever saved
    async fn bass_strength(&self) -> Result<Option<u16>>;

    /// Save the bass-boost strength
    async fn set_bass_strength(&self, strength: u16) -> Result<()>;
}

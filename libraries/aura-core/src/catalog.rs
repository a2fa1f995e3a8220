//! In-memory track catalog
//!
//! Mirrors the media-index query the mobile app runs: only entries flagged as
//! music, only inside the configured folder, ordered by title.

use crate::error::Result;
use crate::traits::TrackCatalog;
use crate::types::{FolderFilter, Track};
use async_trait::async_trait;
use std::cmp::Ordering;

/// A row of the media index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Track metadata
    pub track: Track,

    /// Path relative to the storage root (e.g. `AURA_Music/album/song.mp3`)
    pub relative_path: String,

    /// Whether the index classifies this file as music (not a ringtone, podcast, ...)
    pub is_music: bool,
}

impl CatalogEntry {
    /// Create a music entry at `relative_path`
    pub fn music(track: Track, relative_path: impl Into<String>) -> Self {
        Self {
            track,
            relative_path: relative_path.into(),
            is_music: true,
        }
    }
}

/// Catalog backed by a snapshot of index entries
#[derive(Debug, Clone, Default)]
pub struct LibraryCatalog {
    entries: Vec<CatalogEntry>,
}

impl LibraryCatalog {
    /// Create a catalog from index entries
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Add an entry to the snapshot
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    /// Number of entries in the snapshot (before filtering)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Synchronous form of [`TrackCatalog::list_tracks`]
    pub fn query(&self, filter: &FolderFilter) -> Vec<Track> {
        let mut tracks: Vec<Track> = self
            .entries
            .iter()
            .filter(|entry| entry.is_music && filter.matches(&entry.relative_path))
            .map(|entry| entry.track.clone())
            .collect();

        tracks.sort_by(compare_titles);

        tracing::debug!(
            folder = filter.prefix(),
            matched = tracks.len(),
            total = self.entries.len(),
            "Catalog query"
        );

        tracks
    }
}

#[async_trait]
impl TrackCatalog for LibraryCatalog {
    async fn list_tracks(&self, filter: &FolderFilter) -> Result<Vec<Track>> {
        Ok(self.query(filter))
    }
}

/// Title order: case-insensitive first, then exact title, then id for stability
fn compare_titles(a: &Track, b: &Track) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}

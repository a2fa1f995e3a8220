/// Track domain type
use crate::types::{AlbumId, ContentHandle, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Audio track
///
/// Created by the track catalog at enumeration time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album identifier (for artwork lookup)
    pub album_id: AlbumId,

    /// Track duration in milliseconds
    pub duration_ms: u64,

    /// Handle used to open a decode stream
    pub content: ContentHandle,
}

impl Track {
    /// Create a new track
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        album_id: AlbumId,
        duration_ms: u64,
        content: ContentHandle,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            album_id,
            duration_ms,
            content,
        }
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Folder restriction applied when enumerating the library
///
/// Matches tracks whose path relative to the storage root starts with the
/// given prefix, e.g. `"AURA_Music/"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderFilter {
    prefix: String,
}

impl FolderFilter {
    /// Create a filter for the given relative folder prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    /// Filter that accepts every folder
    pub fn any() -> Self {
        Self {
            prefix: String::new(),
        }
    }

    /// The normalized prefix (always ends with `/` unless empty)
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check whether a relative path lies inside the filtered folder
    pub fn matches(&self, relative_path: &str) -> bool {
        relative_path.starts_with(&self.prefix)
    }
}

impl Default for FolderFilter {
    fn default() -> Self {
        Self::new("AURA_Music/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_filter_normalizes_trailing_slash() {
        let filter = FolderFilter::new("AURA_Music");
        assert_eq!(filter.prefix(), "AURA_Music/");
        assert!(filter.matches("AURA_Music/song.mp3"));
        assert!(filter.matches("AURA_Music/live/song.mp3"));
        assert!(!filter.matches("AURA_Musicians/song.mp3"));
        assert!(!filter.matches("Download/song.mp3"));
    }

    #[test]
    fn any_filter_matches_everything() {
        let filter = FolderFilter::any();
        assert!(filter.matches("Download/song.mp3"));
        assert!(filter.matches(""));
    }

    #[test]
    fn track_duration_conversion() {
        let track = Track::new(
            TrackId::new(1),
            "Song",
            "Artist",
            AlbumId::new(1),
            90_500,
            ContentHandle::new("content://1"),
        );
        assert_eq!(track.duration(), Duration::from_millis(90_500));
    }
}

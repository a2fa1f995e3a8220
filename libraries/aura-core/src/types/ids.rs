/// ID types for Aura entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track identifier, as assigned by the platform media index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(i64);

impl TrackId {
    /// Create a new track ID
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Album identifier, used to resolve album artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(i64);

impl AlbumId {
    /// Create a new album ID
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle used to open a decode stream for a track
///
/// On mobile platforms this is a content URI; on desktop it may be a file path.
/// The playback core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(String);

impl ContentHandle {
    /// Create a new content handle
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

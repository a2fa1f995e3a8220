use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Number of natural completions recorded for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPlayCount {
    /// Track the count belongs to
    pub track_id: TrackId,

    /// Completed plays
    pub play_count: u32,
}

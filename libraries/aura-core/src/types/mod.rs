//! Domain types shared across Aura crates

mod ids;
mod play_count;
mod track;

pub use ids::{AlbumId, ContentHandle, TrackId};
pub use play_count::SongPlayCount;
pub use track::{FolderFilter, Track};

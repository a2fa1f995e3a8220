//! Aura Core
//!
//! Platform-agnostic core types, traits, and error handling for the Aura
//! playback engine.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `AlbumId`, `ContentHandle`
//! - **Collaborator Traits**: `TrackCatalog`, `PlayCountStore`, `SettingsStore`
//! - **Error Handling**: Unified `AuraError` and `Result` types
//! - **Catalog**: an in-memory, folder-filtered `LibraryCatalog`
//!
//! # Example
//!
//! ```rust
//! use aura_core::types::{AlbumId, ContentHandle, Track, TrackId};
//!
//! let track = Track::new(
//!     TrackId::new(7),
//!     "Blue in Green",
//!     "Miles Davis",
//!     AlbumId::new(3),
//!     337_000,
//!     ContentHandle::new("content://media/external/audio/media/7"),
//! );
//!
//! assert_eq!(track.duration().as_secs(), 337);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use catalog::{CatalogEntry, LibraryCatalog};
pub use error::{AuraError, Result};
pub use traits::{PlayCountStore, SettingsStore, TrackCatalog, MAX_BASS_STRENGTH};
pub use types::{AlbumId, ContentHandle, FolderFilter, SongPlayCount, Track, TrackId};

//! Aura - Background Playback Engine
//!
//! Platform-agnostic playback core for the Aura music & mood journal.
//!
//! This crate provides:
//! - Ordered queue with reversible shuffle (upcoming order + play history)
//! - Repeat modes (Off, All, One)
//! - Playback controller state machine
//! - Effects rack (spatial reverb/virtualizer, bass boost)
//! - Audio focus coordination
//! - Now-playing notification and media-session publishing
//! - Observable session state (`tokio::sync::watch`)
//! - A single-task service actor that serializes every entry point
//!
//! # Architecture
//!
//! Platform facilities (decode primitive, audio focus, effects, notification
//! surface, artwork lookup) are provided via traits. The
//! [`PlaybackService`] owns a [`PlaybackController`] on one tokio task; UI
//! commands and platform callbacks reach it only as messages.
//!
//! # Example: Queue and Shuffle
//!
//! ```rust
//! use aura_core::{AlbumId, ContentHandle, Track, TrackId};
//! use aura_playback::PlayQueue;
//!
//! let tracks: Vec<Track> = ["A", "B", "C"]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, title)| {
//!         Track::new(
//!             TrackId::new(i as i64),
//!             *title,
//!             "Artist",
//!             AlbumId::new(1),
//!             180_000,
//!             ContentHandle::new(format!("content://media/{}", i)),
//!         )
//!     })
//!     .collect();
//!
//! let mut queue = PlayQueue::with_seed(7);
//! queue.load(tracks, 0);
//!
//! assert_eq!(queue.advance(), Some(1));
//! assert_eq!(queue.retreat(), Some(0));
//!
//! queue.toggle_shuffle();
//! let next = queue.peek_next();
//! assert_eq!(queue.advance(), next);
//! ```
//!
//! # Example: Running the Service
//!
//! ```rust,no_run
//! use aura_playback::{PlaybackDeps, PlaybackService, ServiceConfig};
//!
//! # async fn example(deps: PlaybackDeps, tracks: Vec<aura_core::Track>) -> aura_playback::Result<()> {
//! let handle = PlaybackService::spawn(ServiceConfig::load(None)?, deps).await?;
//!
//! handle.load_playlist(tracks, 0)?;
//! handle.next()?;
//!
//! let mut state = handle.subscribe();
//! state.changed().await.ok();
//! println!("Now playing: {:?}", state.borrow().current_track);
//!
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod controller;
pub mod effects;
pub mod error;
pub mod focus;
pub mod history;
pub mod player;
pub mod queue;
pub mod service;
pub mod session;
pub mod shuffle;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use commands::{PlatformEvent, PlayerCommand};
pub use config::ServiceConfig;
pub use controller::{PlaybackController, PlaybackDeps};
pub use effects::{AudioEffect, EffectFactory, EffectSlot, EffectUnit, EffectsRack};
pub use error::{PlaybackError, Result};
pub use focus::{AudioFocusArbiter, FocusAction, FocusChange, FocusCoordinator};
pub use history::History;
pub use player::{AudioSessionId, MediaPlayer, SourceId};
pub use queue::{PlayQueue, ShuffleState};
pub use service::{PlatformNotifier, PlaybackHandle, PlaybackService};
pub use session::{
    Artwork, ArtworkResolver, ArtworkUpdate, FallbackText, NowPlaying, NowPlayingCard,
    NowPlayingSurface, SessionMetadata, SessionPublisher, TransportState,
};
pub use state::{SessionState, StateStore};
pub use types::{EffectKind, EffectSettings, PlayerState, RepeatMode, TransportAction};

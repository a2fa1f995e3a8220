//! Messages delivered to the playback service actor

use crate::focus::FocusChange;
use crate::player::SourceId;
use crate::types::EffectKind;
use aura_core::Track;
use tokio::sync::oneshot;

/// Commands from the UI and media-session layer
#[derive(Debug)]
pub enum PlayerCommand {
    /// Replace the queue and start at `start_index`
    LoadPlaylist {
        /// New queue
        tracks: Vec<Track>,
        /// Index to start at
        start_index: usize,
    },

    /// Toggle play/pause
    PlayOrPause,

    /// Start or resume (no-op while playing)
    Play,

    /// Pause (no-op while paused)
    Pause,

    /// Skip to next track
    Next,

    /// Restart or go to previous track
    Previous,

    /// Seek within the current track (milliseconds)
    SeekTo(u64),

    /// Play the queue entry at this index
    PlayAtIndex(usize),

    /// Toggle shuffle
    ToggleShuffle,

    /// Cycle repeat mode
    CycleRepeat,

    /// Enable or disable an effect
    SetEffect {
        /// Which effect
        kind: EffectKind,
        /// New flag
        enabled: bool,
    },

    /// Set bass-boost strength (0-1000)
    SetBassStrength(i32),

    /// Preview the next track
    PeekNext(oneshot::Sender<Option<Track>>),

    /// Queue in effective play order
    EffectiveQueue(oneshot::Sender<Vec<Track>>),
}

/// Everything carried on the command channel
///
/// Shutdown travels on the same channel so it is ordered after every command
/// sent before it.
#[derive(Debug)]
pub(crate) enum Envelope {
    /// Regular command
    Command(PlayerCommand),

    /// Tear down; acknowledged once everything is released
    Shutdown(oneshot::Sender<()>),
}

/// Callbacks from the platform (decode primitive, audio focus)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The source played to its end
    Completed(SourceId),

    /// Decode primitive failed on the source
    DecodeError {
        /// Load the error belongs to
        source: SourceId,
        /// Platform error text
        message: String,
    },

    /// Audio focus changed
    FocusChanged(FocusChange),
}

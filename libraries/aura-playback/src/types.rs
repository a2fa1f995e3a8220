//! Core types for playback management

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

pub use aura_core::MAX_BASS_STRENGTH;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// No queue loaded
    #[default]
    Idle,

    /// Track loaded, not producing audio
    Paused,

    /// Currently playing
    Playing,

    /// Track reached its end; resolved immediately according to the repeat mode
    Completed,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop when the queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the fixed cycle `Off -> All -> One -> Off`
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

/// User-facing effect toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Reverb + virtualizer ("8D" mode)
    Spatial,

    /// Bass enhancement
    BassBoost,
}

/// Effect flags that survive track changes
///
/// Independent of whether the live effect instances exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Reverb + virtualizer enabled
    pub spatial_enabled: bool,

    /// Bass boost enabled
    pub bass_boost_enabled: bool,

    /// Bass boost strength (0-1000)
    pub bass_strength: u16,
}

impl EffectSettings {
    /// Settings with everything off and the given persisted strength
    pub fn with_bass_strength(bass_strength: u16) -> Self {
        Self {
            bass_strength: bass_strength.min(MAX_BASS_STRENGTH),
            ..Self::default()
        }
    }
}

/// Validate a requested bass strength
pub fn validate_bass_strength(strength: i32) -> Result<u16> {
    u16::try_from(strength)
        .ok()
        .filter(|s| *s <= MAX_BASS_STRENGTH)
        .ok_or(PlaybackError::InvalidBassStrength(strength))
}

/// Transport buttons shown on the now-playing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportAction {
    /// Skip to previous (or restart)
    Previous,

    /// Toggle play/pause
    PlayPause,

    /// Skip to next
    Next,

    /// Seek within the track (media session only)
    Seek,
}

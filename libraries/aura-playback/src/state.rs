//! Observable playback session state
//!
//! Single writer (the service actor), any number of readers. Observers only
//! wake when a write actually changes something.

use crate::types::{EffectSettings, PlayerState, RepeatMode};
use aura_core::Track;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Everything the UI can observe about the playback session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Decode primitive is producing audio
    pub is_playing: bool,

    /// Track under the cursor
    pub current_track: Option<Track>,

    /// Position in milliseconds
    pub position_ms: u64,

    /// Shuffle enabled
    pub shuffle_enabled: bool,

    /// Repeat mode
    pub repeat_mode: RepeatMode,

    /// Effect flags and bass strength
    pub effects: EffectSettings,

    /// Controller state machine position
    pub player_state: PlayerState,
}

impl SessionState {
    /// Fresh state with the persisted bass strength
    pub fn with_bass_strength(bass_strength: u16) -> Self {
        Self {
            effects: EffectSettings::with_bass_strength(bass_strength),
            ..Self::default()
        }
    }
}

/// Writer side of the observable state
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<SessionState>,
}

impl StateStore {
    /// Create store holding `initial`
    pub fn new(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Apply `f` and notify observers if the state changed
    ///
    /// Returns whether anything changed.
    pub fn modify<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut SessionState),
    {
        self.tx.send_if_modified(|state| {
            let before = state.clone();
            f(state);
            *state != before
        })
    }

    /// Update the position only
    pub fn set_position(&self, position_ms: u64) -> bool {
        self.tx.send_if_modified(|state| {
            if state.position_ms == position_ms {
                return false;
            }
            state.position_ms = position_ms;
            true
        })
    }

    /// New receiver seeing the latest state
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Clone of the latest state
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn observers_wake_only_on_change() {
        let store = StateStore::new(SessionState::default());
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        assert!(!store.modify(|s| s.is_playing = false));
        assert!(!rx.has_changed().unwrap());

        assert!(store.modify(|s| s.is_playing = true));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_playing);
    }

    #[test]
    fn set_position_skips_identical_value() {
        let store = StateStore::new(SessionState::default());
        assert!(store.set_position(1500));
        assert!(!store.set_position(1500));
        assert_eq!(store.snapshot().position_ms, 1500);
    }

    #[test]
    fn reset_keeps_persisted_strength() {
        let state = SessionState::with_bass_strength(400);
        assert_eq!(state.effects.bass_strength, 400);
        assert!(!state.effects.bass_boost_enabled);
        assert_eq!(state.player_state, PlayerState::Idle);
        assert!(state.current_track.is_none());
    }
}

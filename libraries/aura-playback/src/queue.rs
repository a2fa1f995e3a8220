//! Playback queue and shuffle engine
//!
//! Owns the ordered track list, the current-index cursor, shuffle/repeat mode,
//! and, while shuffle is on, the randomized upcoming order plus play history:
//!
//! ```text
//! history (played)     current     upcoming (randomized)
//! [ 4, 0 ]         ->    2     ->  [ 1, 3 ]
//! ```
//!
//! While shuffle is on, `history ∪ {current} ∪ upcoming` is exactly the set of
//! queue indices. Navigation moves indices between the three without
//! re-randomizing, so `advance` followed by `retreat` is always reversible.

use crate::history::History;
use crate::shuffle::upcoming_order;
use crate::types::RepeatMode;
use aura_core::Track;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Shuffle bookkeeping, present only while shuffle is enabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShuffleState {
    upcoming: VecDeque<usize>,
    history: History,
}

impl ShuffleState {
    /// Indices not yet played, in play order
    pub fn upcoming(&self) -> &VecDeque<usize> {
        &self.upcoming
    }

    /// Indices played before the current one
    pub fn history(&self) -> &History {
        &self.history
    }
}

/// Ordered playback queue with reversible shuffle
#[derive(Debug, Clone)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    current: Option<usize>,
    shuffle: Option<ShuffleState>,
    repeat: RepeatMode,
    rng: StdRng,
}

impl PlayQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty queue with a deterministic shuffle sequence
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            tracks: Vec::new(),
            current: None,
            shuffle: None,
            repeat: RepeatMode::Off,
            rng,
        }
    }

    // ===== Loading =====

    /// Replace the queue and point the cursor at `start_index`
    ///
    /// An out-of-range start index on a non-empty queue falls back to 0.
    /// Regenerates the shuffle order if shuffle is on. Returns the new current
    /// index (`None` for an empty queue).
    pub fn load(&mut self, tracks: Vec<Track>, start_index: usize) -> Option<usize> {
        self.tracks = tracks;
        self.current = match self.tracks.len() {
            0 => None,
            len if start_index < len => Some(start_index),
            len => {
                tracing::debug!(start_index, len, "Start index out of range, using 0");
                Some(0)
            }
        };

        if self.shuffle.is_some() {
            self.regenerate_shuffle();
        }

        self.current
    }

    /// Check whether `tracks` is exactly the loaded queue
    pub fn is_same_playlist(&self, tracks: &[Track]) -> bool {
        !self.tracks.is_empty() && self.tracks == tracks
    }

    // ===== Navigation =====

    /// Move to the next index
    ///
    /// Sequential mode wraps around. Shuffle mode refills the upcoming order
    /// (and restarts history) once it runs dry, so play can continue
    /// indefinitely.
    pub fn advance(&mut self) -> Option<usize> {
        let current = self.current?;
        let len = self.tracks.len();
        if len == 1 {
            return Some(current);
        }

        let next = match self.shuffle.as_mut() {
            None => (current + 1) % len,
            Some(state) => {
                if state.upcoming.is_empty() {
                    state.upcoming = upcoming_order(len, Some(current), &mut self.rng);
                    state.history.clear();
                }
                let next = state.upcoming.pop_front()?;
                state.history.push(current);
                next
            }
        };

        self.current = Some(next);
        Some(next)
    }

    /// Move to the previous index
    ///
    /// In shuffle mode returns `None` (and changes nothing) when there is no
    /// history to go back to.
    pub fn retreat(&mut self) -> Option<usize> {
        let current = self.current?;
        let len = self.tracks.len();
        if len == 1 {
            return Some(current);
        }

        let previous = match self.shuffle.as_mut() {
            None => (current + len - 1) % len,
            Some(state) => {
                let previous = state.history.pop()?;
                state.upcoming.push_front(current);
                previous
            }
        };

        self.current = Some(previous);
        Some(previous)
    }

    /// Explicitly select `index` (queue view, "play next" card)
    ///
    /// In shuffle mode a pending index is pulled out of the upcoming order and
    /// the old current index moves to history. Jumping to an index already in
    /// history restarts the shuffle horizon from there.
    pub fn jump_to(&mut self, index: usize) -> Option<usize> {
        if index >= self.tracks.len() {
            return None;
        }

        let Some(current) = self.current else {
            self.current = Some(index);
            if self.shuffle.is_some() {
                self.regenerate_shuffle();
            }
            return Some(index);
        };

        if index == current {
            return Some(index);
        }

        match self.shuffle.as_mut() {
            None => self.current = Some(index),
            Some(state) => match state.upcoming.iter().position(|i| *i == index) {
                Some(position) => {
                    state.upcoming.remove(position);
                    state.history.push(current);
                    self.current = Some(index);
                }
                None => {
                    self.current = Some(index);
                    self.regenerate_shuffle();
                }
            },
        }

        Some(index)
    }

    /// Index that [`PlayQueue::advance`] would select, without mutating anything
    ///
    /// `None` when shuffle's upcoming order is empty or, in sequential mode,
    /// when the queue has fewer than two tracks.
    pub fn peek_next(&self) -> Option<usize> {
        let current = self.current?;
        let len = self.tracks.len();

        match &self.shuffle {
            None => (len >= 2).then(|| (current + 1) % len),
            Some(state) => state.upcoming.front().copied(),
        }
    }

    /// Check whether natural completion has nowhere left to go
    ///
    /// Sequential: the current index is the last one. Shuffle: nothing upcoming.
    pub fn is_at_end(&self) -> bool {
        match (&self.shuffle, self.current) {
            (_, None) => true,
            (None, Some(current)) => current + 1 >= self.tracks.len(),
            (Some(state), Some(_)) => state.upcoming.is_empty(),
        }
    }

    // ===== Shuffle & Repeat =====

    /// Flip shuffle; returns whether shuffle is now on
    ///
    /// Turning on builds a fresh upcoming order with empty history; turning off
    /// drops both and falls back to index arithmetic.
    pub fn toggle_shuffle(&mut self) -> bool {
        if self.shuffle.take().is_none() {
            self.regenerate_shuffle();
        }
        self.is_shuffle()
    }

    /// Advance repeat mode `Off -> All -> One -> Off`
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.next();
        self.repeat
    }

    /// Set repeat mode
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    fn regenerate_shuffle(&mut self) {
        let upcoming = upcoming_order(self.tracks.len(), self.current, &mut self.rng);
        self.shuffle = Some(ShuffleState {
            upcoming,
            history: History::new(),
        });
    }

    // ===== Queries =====

    /// Queue indices in effective play order: `[current] + upcoming` when
    /// shuffled, the raw order otherwise
    pub fn effective_order(&self) -> Vec<usize> {
        match &self.shuffle {
            Some(state) => self
                .current
                .into_iter()
                .chain(state.upcoming.iter().copied())
                .collect(),
            None => (0..self.tracks.len()).collect(),
        }
    }

    /// Tracks in effective play order (display only)
    pub fn effective_queue(&self) -> Vec<Track> {
        self.effective_order()
            .into_iter()
            .filter_map(|i| self.tracks.get(i).cloned())
            .collect()
    }

    /// All tracks in load order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track at `index`
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Current cursor
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Track under the cursor
    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether shuffle is on
    pub fn is_shuffle(&self) -> bool {
        self.shuffle.is_some()
    }

    /// Shuffle bookkeeping (if shuffle is on)
    pub fn shuffle_state(&self) -> Option<&ShuffleState> {
        self.shuffle.as_ref()
    }

    /// Current repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }
}

impl Default for PlayQueue {
    fn default() -> Self {
        Self::new()
    }
}

//! Playback controller - core state machine
//!
//! Coordinates queue, decode primitive, effects, audio focus and the
//! now-playing surface. Owned by exactly one task (see [`crate::service`]);
//! nothing here is shared or locked.
//!
//! ```text
//! Idle --load--> Playing <--play/pause--> Paused
//!                   |                        ^
//!                   +--completion--> Completed (resolved by repeat mode)
//! ```
//!
//! Nothing crosses the command boundary as an error: decode failures, focus
//! denial and effect failures are logged and reflected in the state store.

use crate::config::ServiceConfig;
use crate::effects::{EffectFactory, EffectsRack};
use crate::error::Result;
use crate::focus::{AudioFocusArbiter, FocusAction, FocusChange, FocusCoordinator};
use crate::player::{MediaPlayer, SourceId};
use crate::queue::PlayQueue;
use crate::session::{ArtworkResolver, ArtworkUpdate, NowPlaying, NowPlayingSurface, SessionPublisher};
use crate::state::{SessionState, StateStore};
use crate::types::{validate_bass_strength, EffectKind, PlayerState, RepeatMode};
use aura_core::{PlayCountStore, SettingsStore, Track, TrackId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// External collaborators handed to the controller
///
/// The decode primitive, focus arbiter, effect factory and surface become
/// exclusively owned by the controller.
pub struct PlaybackDeps {
    /// Decode primitive
    pub player: Box<dyn MediaPlayer>,

    /// Audio-focus arbiter
    pub focus: Box<dyn AudioFocusArbiter>,

    /// Effect constructor
    pub effects: Box<dyn EffectFactory>,

    /// Notification/media-session surface
    pub surface: Box<dyn NowPlayingSurface>,

    /// Album art lookup (optional)
    pub artwork: Option<Arc<dyn ArtworkResolver>>,

    /// Play-count store (optional)
    pub play_counts: Option<Arc<dyn PlayCountStore>>,

    /// Settings store for the bass strength (optional)
    pub settings: Option<Arc<dyn SettingsStore>>,
}

/// A source handed to the decode primitive
#[derive(Debug, Clone, Copy)]
struct LoadedSource {
    id: SourceId,
    track_id: TrackId,
    /// Its completion was already recorded
    counted: bool,
}

/// Playback controller
pub struct PlaybackController {
    queue: PlayQueue,
    player: Box<dyn MediaPlayer>,
    focus: FocusCoordinator,
    rack: EffectsRack,
    publisher: SessionPublisher,
    store: StateStore,
    play_counts: Option<Arc<dyn PlayCountStore>>,
    settings: Option<Arc<dyn SettingsStore>>,
    state: PlayerState,
    prepared: bool,
    polling: bool,
    restart_threshold_ms: u64,
    last_source_id: u64,
    /// Source currently in the decode primitive
    loaded: Option<LoadedSource>,
    /// Source it replaced; its completion may still be in flight
    replaced: Option<LoadedSource>,
}

impl PlaybackController {
    /// Create controller
    ///
    /// `bass_strength` is the persisted strength (or the configured default);
    /// everything else in the state store starts from defaults. Artwork lookups
    /// report back on `artwork_tx`.
    pub fn new(
        config: &ServiceConfig,
        deps: PlaybackDeps,
        bass_strength: u16,
        artwork_tx: mpsc::UnboundedSender<ArtworkUpdate>,
    ) -> Self {
        let queue = match config.shuffle_seed {
            Some(seed) => PlayQueue::with_seed(seed),
            None => PlayQueue::new(),
        };

        Self {
            queue,
            player: deps.player,
            focus: FocusCoordinator::new(deps.focus),
            rack: EffectsRack::new(deps.effects),
            publisher: SessionPublisher::new(
                deps.surface,
                deps.artwork,
                artwork_tx,
                config.fallback_text(),
            ),
            store: StateStore::new(SessionState::with_bass_strength(bass_strength)),
            play_counts: deps.play_counts,
            settings: deps.settings,
            state: PlayerState::Idle,
            prepared: false,
            polling: false,
            restart_threshold_ms: config.restart_threshold_ms,
            last_source_id: 0,
            loaded: None,
            replaced: None,
        }
    }

    // ===== Loading =====

    /// Replace the queue and start playing at `start_index`
    ///
    /// Loading the list that is already queued just jumps to `start_index`,
    /// and does nothing when that is already the current track. An empty list
    /// stops playback and returns to `Idle`.
    pub async fn load_playlist(&mut self, tracks: Vec<Track>, start_index: usize) {
        if self.queue.is_same_playlist(&tracks) {
            let index = if start_index < tracks.len() { start_index } else { 0 };
            if self.queue.current_index() == Some(index) {
                tracing::debug!(index, "Same playlist and index, nothing to do");
                return;
            }
            tracing::debug!(index, "Same playlist, jumping to index");
            self.play_song_at_index(index).await;
            return;
        }

        tracing::info!(tracks = tracks.len(), start_index, "Loading playlist");

        if self.queue.load(tracks, start_index).is_none() {
            self.stop_polling();
            self.retire_source();
            self.player.reset();
            self.prepared = false;
            self.state = PlayerState::Idle;
            self.sync_store();
            self.publisher.track_changed(now_playing(&self.queue, self.player.as_ref()));
            return;
        }

        if self.focus.request() {
            self.start_current().await;
        } else {
            // Loaded but silent; play/pause retries the load later
            self.retire_source();
            self.player.reset();
            self.prepared = false;
            self.state = PlayerState::Paused;
            self.sync_store();
            self.publisher.track_changed(now_playing(&self.queue, self.player.as_ref()));
        }
    }

    /// Select and play the track at `index`
    ///
    /// Audio focus is requested first; on denial nothing changes.
    pub async fn play_song_at_index(&mut self, index: usize) {
        if index >= self.queue.len() {
            tracing::debug!(index, len = self.queue.len(), "Index out of range, ignoring");
            return;
        }
        if !self.focus.request() {
            return;
        }

        self.queue.jump_to(index);
        self.start_current().await;
    }

    // ===== Transport =====

    /// Toggle between playing and paused
    ///
    /// A track that never prepared (decode error, focus denied at load) is
    /// reloaded from scratch.
    pub async fn play_or_pause(&mut self) {
        if self.queue.current_track().is_none() {
            return;
        }

        if self.player.is_playing() {
            self.focus.clear_pending_resume();
            self.pause_output();
        } else if !self.prepared {
            if self.focus.request() {
                self.start_current().await;
            }
        } else {
            self.resume();
        }
    }

    /// Start or resume; no-op if already playing (media-session "play")
    pub async fn play(&mut self) {
        if !self.player.is_playing() {
            self.play_or_pause().await;
        }
    }

    /// Pause; no-op if not playing (media-session "pause")
    pub fn pause(&mut self) {
        if self.player.is_playing() {
            self.focus.clear_pending_resume();
            self.pause_output();
        }
    }

    /// Skip to the next track in effective order
    pub async fn play_next(&mut self) {
        if self.queue.is_empty() || !self.focus.request() {
            return;
        }

        if self.queue.advance().is_some() {
            self.start_current().await;
        }
    }

    /// Restart the current track, or go back one
    ///
    /// Restarts when the position is past the configured threshold. In shuffle
    /// mode with no history this is a no-op.
    pub async fn play_previous(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        if self.prepared && self.player.position_ms() > self.restart_threshold_ms {
            tracing::debug!("Restarting current track");
            self.seek_to(0);
            return;
        }

        if !self.focus.request() {
            return;
        }

        if self.queue.retreat().is_some() {
            self.start_current().await;
        }
    }

    /// Seek within the current track, clamped to its duration
    ///
    /// The new position is written to the state store immediately.
    pub fn seek_to(&mut self, position_ms: u64) {
        let Some(duration_ms) = self.queue.current_track().map(|t| t.duration_ms) else {
            return;
        };
        if !self.prepared {
            return;
        }

        let position_ms = position_ms.min(duration_ms);
        self.player.seek_to(position_ms);
        self.store.set_position(position_ms);
        self.publisher
            .position_changed(now_playing(&self.queue, self.player.as_ref()));
    }

    // ===== Platform events =====

    /// Natural end of the source identified by `source`
    ///
    /// Only the playing source drives a transition. A completion for the
    /// source that was just replaced (e.g. by a user "next" queued ahead of
    /// it) still counts that play; anything else is dropped.
    pub async fn on_completion(&mut self, source: SourceId) {
        let Some(loaded) = self.loaded.filter(|l| l.id == source) else {
            self.on_replaced_completion(source);
            return;
        };
        if !self.prepared || self.state != PlayerState::Playing {
            tracing::debug!(source = source.0, state = ?self.state, "Ignoring completion, source not playing");
            return;
        }
        let Some(track) = self.queue.current_track().cloned() else {
            return;
        };

        tracing::debug!(track_id = track.id.get(), repeat = ?self.queue.repeat(), "Track completed");
        self.state = PlayerState::Completed;
        self.stop_polling();
        self.record_play(loaded.track_id);
        if let Some(loaded) = &mut self.loaded {
            loaded.counted = true;
        }

        match self.queue.repeat() {
            RepeatMode::One => self.start_current().await,
            RepeatMode::All => self.play_next().await,
            RepeatMode::Off if self.queue.is_at_end() => {
                tracing::info!(track_id = track.id.get(), "End of queue");
                self.player.pause();
                self.player.seek_to(0);
                self.state = PlayerState::Paused;
                self.sync_store();
                self.publisher
                    .state_changed(now_playing(&self.queue, self.player.as_ref()));
            }
            RepeatMode::Off => self.play_next().await,
        }

        // Focus denied on the way to the next track
        if self.state == PlayerState::Completed {
            self.state = PlayerState::Paused;
            self.sync_store();
        }
    }

    /// Decode primitive reported an error for `source`
    ///
    /// The track stays current so the user can retry. Errors for a source
    /// that is no longer loaded are dropped.
    pub fn on_decode_error(&mut self, source: SourceId, message: &str) {
        if self.loaded.map(|l| l.id) != Some(source) {
            tracing::debug!(source = source.0, error = message, "Dropping decode error for stale source");
            return;
        }

        tracing::error!(
            track_id = self.queue.current_track().map(|t| t.id.get()),
            error = message,
            "Decode error"
        );

        self.stop_polling();
        self.loaded = None;
        self.player.reset();
        self.prepared = false;
        if self.queue.current_track().is_some() {
            self.state = PlayerState::Paused;
        }
        self.sync_store();
        self.publisher
            .state_changed(now_playing(&self.queue, self.player.as_ref()));
    }

    /// Platform audio focus changed
    pub fn on_focus_change(&mut self, change: FocusChange) {
        match self.focus.on_change(change, self.player.is_playing()) {
            FocusAction::Pause => self.pause_output(),
            FocusAction::Resume => self.resume(),
            FocusAction::Ignore => {}
        }
    }

    /// Artwork lookup finished
    pub fn on_artwork(&mut self, update: ArtworkUpdate) {
        let now = now_playing(&self.queue, self.player.as_ref());
        self.publisher.apply_artwork(update, now);
    }

    // ===== Modes & effects =====

    /// Toggle shuffle; returns whether shuffle is now on
    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = self.queue.toggle_shuffle();
        tracing::debug!(enabled, "Shuffle toggled");
        self.store.modify(|s| s.shuffle_enabled = enabled);
        enabled
    }

    /// Cycle repeat mode `Off -> All -> One -> Off`
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        let mode = self.queue.cycle_repeat();
        tracing::debug!(?mode, "Repeat mode changed");
        self.store.modify(|s| s.repeat_mode = mode);
        mode
    }

    /// Enable or disable an effect
    ///
    /// The flag is stored first; a missing or failing live instance is logged
    /// and the flag is honored on the next track change.
    pub fn set_effect(&mut self, kind: EffectKind, enabled: bool) {
        self.store.modify(|s| match kind {
            EffectKind::Spatial => s.effects.spatial_enabled = enabled,
            EffectKind::BassBoost => s.effects.bass_boost_enabled = enabled,
        });

        let applied = match kind {
            EffectKind::Spatial => self.rack.apply_spatial(enabled),
            EffectKind::BassBoost => self.rack.apply_bass_boost(enabled),
        };
        if let Err(e) = applied {
            tracing::warn!(?kind, enabled, error = %e, "Failed to apply effect");
        }
    }

    /// Set bass-boost strength (0-1000)
    ///
    /// Out-of-range values are rejected without touching any state. Accepted
    /// values are persisted in the background.
    pub fn set_bass_strength(&mut self, strength: i32) -> Result<()> {
        let strength = validate_bass_strength(strength)?;

        self.store.modify(|s| s.effects.bass_strength = strength);
        if let Err(e) = self.rack.apply_bass_strength(strength) {
            tracing::warn!(strength, error = %e, "Failed to apply bass strength");
        }

        if let Some(settings) = &self.settings {
            let settings = Arc::clone(settings);
            tokio::spawn(async move {
                if let Err(e) = settings.set_bass_strength(strength).await {
                    tracing::warn!(strength, error = %e, "Failed to persist bass strength");
                }
            });
        }

        Ok(())
    }

    // ===== Polling =====

    /// One poll tick; returns whether polling should continue
    ///
    /// Stops (and stays stopped) as soon as the decode primitive is not
    /// actively playing.
    pub fn poll_position(&mut self) -> bool {
        if !self.polling {
            return false;
        }
        if !self.player.is_playing() {
            tracing::debug!("Playback inactive, polling stopped");
            self.polling = false;
            return false;
        }

        self.store.set_position(self.player.position_ms());
        self.publisher
            .position_changed(now_playing(&self.queue, self.player.as_ref()));
        true
    }

    /// Whether the poll loop should be scheduled
    pub fn is_polling(&self) -> bool {
        self.polling
    }

    // ===== Queries =====

    /// Track that "next" would play, without changing anything
    pub fn peek_next(&self) -> Option<Track> {
        self.queue
            .peek_next()
            .and_then(|i| self.queue.track(i))
            .cloned()
    }

    /// Queue in effective play order
    pub fn effective_queue(&self) -> Vec<Track> {
        self.queue.effective_queue()
    }

    /// Queue engine (read-only)
    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    /// Controller state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Latest observable state
    pub fn snapshot(&self) -> SessionState {
        self.store.snapshot()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    // ===== Teardown =====

    /// Release everything, in order: polling, effects, decode primitive,
    /// surface, audio focus
    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down playback controller");

        self.stop_polling();
        self.rack.release_all();
        self.player.release();
        self.publisher.release();
        self.focus.abandon();

        self.prepared = false;
        self.state = PlayerState::Idle;
        self.store.modify(|s| s.is_playing = false);
    }

    // ===== Internals =====

    /// Load the current track into the decode primitive and start it
    ///
    /// Caller must hold audio focus.
    async fn start_current(&mut self) {
        let Some(track) = self.queue.current_track().cloned() else {
            return;
        };
        let index = self.queue.current_index();

        self.stop_polling();
        self.retire_source();
        self.player.reset();
        self.prepared = false;

        self.last_source_id += 1;
        let source = SourceId(self.last_source_id);

        match self.load_source(&track, source).await {
            Ok(()) => {
                tracing::info!(track_id = track.id.get(), index, source = source.0, title = %track.title, "Now playing");
                self.loaded = Some(LoadedSource {
                    id: source,
                    track_id: track.id,
                    counted: false,
                });
                self.prepared = true;
                self.state = PlayerState::Playing;

                let effects = self.store.snapshot().effects;
                self.rack.rebuild(self.player.audio_session(), &effects);
                self.polling = true;
            }
            Err(e) => {
                tracing::error!(track_id = track.id.get(), index, error = %e, "Failed to load track");
                self.player.reset();
                self.state = PlayerState::Paused;
            }
        }

        self.sync_store();
        self.publisher
            .track_changed(now_playing(&self.queue, self.player.as_ref()));
    }

    async fn load_source(&mut self, track: &Track, source: SourceId) -> Result<()> {
        self.player.set_source(&track.content, source)?;
        self.player.prepare().await?;
        self.player.start()
    }

    fn pause_output(&mut self) {
        self.player.pause();
        self.stop_polling();
        self.state = PlayerState::Paused;
        self.sync_store();
        self.publisher
            .state_changed(now_playing(&self.queue, self.player.as_ref()));
    }

    /// Resume a prepared track; stays paused if focus is denied
    fn resume(&mut self) {
        if !self.prepared || !self.focus.request() {
            return;
        }

        match self.player.start() {
            Ok(()) => {
                self.state = PlayerState::Playing;
                self.polling = true;
                // A replay after end of queue is a fresh play
                if let Some(loaded) = &mut self.loaded {
                    loaded.counted = false;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to resume playback");
                self.state = PlayerState::Paused;
            }
        }

        self.sync_store();
        self.publisher
            .state_changed(now_playing(&self.queue, self.player.as_ref()));
    }

    fn stop_polling(&mut self) {
        self.polling = false;
    }

    /// The loaded source is about to leave the decode primitive
    fn retire_source(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            self.replaced = Some(loaded);
        }
    }

    fn on_replaced_completion(&mut self, source: SourceId) {
        match &mut self.replaced {
            Some(replaced) if replaced.id == source && !replaced.counted => {
                replaced.counted = true;
                let track_id = replaced.track_id;
                tracing::debug!(source = source.0, track_id = track_id.get(), "Replaced source completed, counting play");
                self.record_play(track_id);
            }
            _ => tracing::debug!(source = source.0, "Dropping completion for stale source"),
        }
    }

    fn record_play(&self, track_id: TrackId) {
        let Some(store) = &self.play_counts else {
            return;
        };

        let store = Arc::clone(store);
        tokio::spawn(async move {
            if let Err(e) = store.increment(track_id).await {
                tracing::warn!(track_id = track_id.get(), error = %e, "Failed to record play");
            }
        });
    }

    /// Mirror controller truth into the observable store
    fn sync_store(&self) {
        let current_track = self.queue.current_track().cloned();
        let is_playing = self.player.is_playing();
        let position_ms = if self.prepared {
            self.player.position_ms()
        } else {
            0
        };
        let player_state = self.state;

        self.store.modify(|s| {
            s.current_track = current_track;
            s.is_playing = is_playing;
            s.position_ms = position_ms;
            s.player_state = player_state;
        });
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("queue", &self.queue)
            .field("state", &self.state)
            .field("prepared", &self.prepared)
            .field("polling", &self.polling)
            .field("loaded", &self.loaded)
            .field("focus", &self.focus)
            .field("rack", &self.rack)
            .finish_non_exhaustive()
    }
}

fn now_playing<'a>(queue: &'a PlayQueue, player: &dyn MediaPlayer) -> NowPlaying<'a> {
    NowPlaying {
        track: queue.current_track(),
        is_playing: player.is_playing(),
        position_ms: player.position_ms(),
    }
}

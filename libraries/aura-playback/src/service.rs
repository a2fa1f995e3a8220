//! Playback service actor
//!
//! One tokio task owns the [`PlaybackController`]. UI commands, platform
//! callbacks, artwork results and poll ticks all arrive as messages and are
//! handled strictly one at a time, so e.g. a completion callback can never
//! interleave with a user-initiated "next".

use crate::commands::{Envelope, PlatformEvent, PlayerCommand};
use crate::config::ServiceConfig;
use crate::controller::{PlaybackController, PlaybackDeps};
use crate::error::{PlaybackError, Result};
use crate::focus::FocusChange;
use crate::player::SourceId;
use crate::session::ArtworkUpdate;
use crate::state::SessionState;
use crate::types::{validate_bass_strength, EffectKind, MAX_BASS_STRENGTH};
use aura_core::{PlayCountStore, SettingsStore, SongPlayCount, Track, TrackCatalog};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Entry point for starting the playback service
pub struct PlaybackService;

impl PlaybackService {
    /// Validate `config`, load the persisted bass strength and start the actor
    pub async fn spawn(config: ServiceConfig, deps: PlaybackDeps) -> Result<PlaybackHandle> {
        config.validate()?;

        let bass_strength = initial_bass_strength(&config, deps.settings.as_deref()).await;
        let play_counts = deps.play_counts.clone();

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (artwork_tx, artwork_rx) = mpsc::unbounded_channel();

        let controller = PlaybackController::new(&config, deps, bass_strength, artwork_tx);
        let state_rx = controller.subscribe();

        tracing::info!(
            bass_strength,
            poll_interval_ms = config.poll_interval_ms,
            "Starting playback service"
        );

        let task = tokio::spawn(run(
            controller,
            command_rx,
            event_rx,
            artwork_rx,
            config.poll_interval(),
        ));

        Ok(PlaybackHandle {
            commands: command_tx,
            events: PlatformNotifier { tx: event_tx },
            state: state_rx,
            play_counts,
            config: Arc::new(config),
            task: Arc::new(std::sync::Mutex::new(Some(task))),
        })
    }
}

/// Persisted strength, else the configured default
async fn initial_bass_strength(config: &ServiceConfig, settings: Option<&dyn SettingsStore>) -> u16 {
    let default = config.effects.default_bass_strength;
    let Some(settings) = settings else {
        return default;
    };

    match settings.bass_strength().await {
        Ok(Some(strength)) => strength.min(MAX_BASS_STRENGTH),
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read bass strength, using default");
            default
        }
    }
}

async fn run(
    mut controller: PlaybackController,
    mut commands: mpsc::UnboundedReceiver<Envelope>,
    mut events: mpsc::UnboundedReceiver<PlatformEvent>,
    mut artwork: mpsc::UnboundedReceiver<ArtworkUpdate>,
    poll_interval: Duration,
) {
    let mut next_poll: Option<Instant> = None;

    loop {
        let deadline = next_poll;
        let poll_tick = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            envelope = commands.recv() => match envelope {
                Some(Envelope::Command(command)) => handle_command(&mut controller, command).await,
                Some(Envelope::Shutdown(ack)) => {
                    controller.shutdown();
                    let _ = ack.send(());
                    break;
                }
                None => {
                    tracing::debug!("All handles dropped");
                    controller.shutdown();
                    break;
                }
            },
            Some(event) = events.recv() => handle_event(&mut controller, event).await,
            Some(update) = artwork.recv() => controller.on_artwork(update),
            () = poll_tick => {
                next_poll = controller
                    .poll_position()
                    .then(|| Instant::now() + poll_interval);
            }
        }

        // Schedule the first tick after playback starts; drop it once stopped
        next_poll = match (controller.is_polling(), next_poll) {
            (true, Some(deadline)) => Some(deadline),
            (true, None) => Some(Instant::now() + poll_interval),
            (false, _) => None,
        };
    }

    tracing::info!("Playback service stopped");
}

async fn handle_command(controller: &mut PlaybackController, command: PlayerCommand) {
    tracing::trace!(?command, "Handling command");

    match command {
        PlayerCommand::LoadPlaylist {
            tracks,
            start_index,
        } => controller.load_playlist(tracks, start_index).await,
        PlayerCommand::PlayOrPause => controller.play_or_pause().await,
        PlayerCommand::Play => controller.play().await,
        PlayerCommand::Pause => controller.pause(),
        PlayerCommand::Next => controller.play_next().await,
        PlayerCommand::Previous => controller.play_previous().await,
        PlayerCommand::SeekTo(position_ms) => controller.seek_to(position_ms),
        PlayerCommand::PlayAtIndex(index) => controller.play_song_at_index(index).await,
        PlayerCommand::ToggleShuffle => {
            controller.toggle_shuffle();
        }
        PlayerCommand::CycleRepeat => {
            controller.cycle_repeat();
        }
        PlayerCommand::SetEffect { kind, enabled } => controller.set_effect(kind, enabled),
        PlayerCommand::SetBassStrength(strength) => {
            if let Err(e) = controller.set_bass_strength(strength) {
                tracing::warn!(strength, error = %e, "Rejected bass strength");
            }
        }
        PlayerCommand::PeekNext(reply) => {
            let _ = reply.send(controller.peek_next());
        }
        PlayerCommand::EffectiveQueue(reply) => {
            let _ = reply.send(controller.effective_queue());
        }
    }
}

async fn handle_event(controller: &mut PlaybackController, event: PlatformEvent) {
    match event {
        PlatformEvent::Completed(source) => controller.on_completion(source).await,
        PlatformEvent::DecodeError { source, message } => {
            controller.on_decode_error(source, &message);
        }
        PlatformEvent::FocusChanged(change) => controller.on_focus_change(change),
    }
}

/// Sender for platform callbacks (decode primitive, audio focus)
///
/// Cheap to clone; hand one to each platform listener.
#[derive(Debug, Clone)]
pub struct PlatformNotifier {
    tx: mpsc::UnboundedSender<PlatformEvent>,
}

impl PlatformNotifier {
    /// Report natural end of the load tagged `source`
    pub fn completed(&self, source: SourceId) -> Result<()> {
        self.send(PlatformEvent::Completed(source))
    }

    /// Report a decode error on the load tagged `source`
    pub fn decode_error(&self, source: SourceId, message: impl Into<String>) -> Result<()> {
        self.send(PlatformEvent::DecodeError {
            source,
            message: message.into(),
        })
    }

    /// Report an audio focus change
    pub fn focus_changed(&self, change: FocusChange) -> Result<()> {
        self.send(PlatformEvent::FocusChanged(change))
    }

    fn send(&self, event: PlatformEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| PlaybackError::ServiceStopped)
    }
}

/// Handle to a running playback service
///
/// Cheap to clone. Commands are fire-and-forget; queries await the actor's
/// reply.
#[derive(Clone)]
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<Envelope>,
    events: PlatformNotifier,
    state: watch::Receiver<SessionState>,
    play_counts: Option<Arc<dyn PlayCountStore>>,
    config: Arc<ServiceConfig>,
    task: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl PlaybackHandle {
    /// Replace the queue and start playing at `start_index`
    pub fn load_playlist(&self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        self.send(PlayerCommand::LoadPlaylist {
            tracks,
            start_index,
        })
    }

    /// List the configured library folder and play it from `start_index`
    ///
    /// Returns the number of tracks queued.
    pub async fn load_library(&self, catalog: &dyn TrackCatalog, start_index: usize) -> Result<usize> {
        let tracks = catalog.list_tracks(&self.config.folder_filter()).await?;
        let count = tracks.len();
        tracing::info!(count, "Library loaded");
        self.load_playlist(tracks, start_index)?;
        Ok(count)
    }

    /// Toggle play/pause
    pub fn play_or_pause(&self) -> Result<()> {
        self.send(PlayerCommand::PlayOrPause)
    }

    /// Start or resume
    pub fn play(&self) -> Result<()> {
        self.send(PlayerCommand::Play)
    }

    /// Pause
    pub fn pause(&self) -> Result<()> {
        self.send(PlayerCommand::Pause)
    }

    /// Skip to next track
    pub fn next(&self) -> Result<()> {
        self.send(PlayerCommand::Next)
    }

    /// Restart or go to previous track
    pub fn previous(&self) -> Result<()> {
        self.send(PlayerCommand::Previous)
    }

    /// Seek within the current track
    pub fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.send(PlayerCommand::SeekTo(position_ms))
    }

    /// Play queue entry `index`
    pub fn play_at_index(&self, index: usize) -> Result<()> {
        self.send(PlayerCommand::PlayAtIndex(index))
    }

    /// Toggle shuffle
    pub fn toggle_shuffle(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleShuffle)
    }

    /// Cycle repeat mode
    pub fn cycle_repeat(&self) -> Result<()> {
        self.send(PlayerCommand::CycleRepeat)
    }

    /// Enable or disable an effect
    pub fn set_effect(&self, kind: EffectKind, enabled: bool) -> Result<()> {
        self.send(PlayerCommand::SetEffect { kind, enabled })
    }

    /// Set bass-boost strength
    ///
    /// Values outside 0-1000 are rejected here and never reach the actor.
    pub fn set_bass_strength(&self, strength: i32) -> Result<()> {
        validate_bass_strength(strength)?;
        self.send(PlayerCommand::SetBassStrength(strength))
    }

    /// Track that "next" would play
    pub async fn peek_next(&self) -> Result<Option<Track>> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::PeekNext(tx))?;
        rx.await.map_err(|_| PlaybackError::ServiceStopped)
    }

    /// Queue in effective play order
    pub async fn effective_queue(&self) -> Result<Vec<Track>> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::EffectiveQueue(tx))?;
        rx.await.map_err(|_| PlaybackError::ServiceStopped)
    }

    /// Most played tracks for the recap screen
    pub async fn top_songs(&self) -> Result<Vec<SongPlayCount>> {
        match &self.play_counts {
            Some(store) => Ok(store.top_n(self.config.library.top_songs).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Latest state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Sender for decode and focus callbacks
    pub fn platform_events(&self) -> PlatformNotifier {
        self.events.clone()
    }

    /// Tear the service down and wait until everything is released
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Envelope::Shutdown(tx))
            .map_err(|_| PlaybackError::ServiceStopped)?;
        rx.await.map_err(|_| PlaybackError::ServiceStopped)?;

        let task = self.task.lock().ok().and_then(|mut task| task.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Playback task ended abnormally");
            }
        }
        Ok(())
    }

    fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(Envelope::Command(command))
            .map_err(|_| PlaybackError::ServiceStopped)
    }
}

impl std::fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackHandle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

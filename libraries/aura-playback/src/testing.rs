//! In-memory fakes for every platform collaborator
//!
//! Each fake is `Clone` and shares its state, so a test keeps one copy to inspect
//! and hands the other to the controller.

use crate::controller::PlaybackDeps;
use crate::effects::{AudioEffect, EffectFactory, EffectUnit};
use crate::error::{PlaybackError, Result};
use crate::focus::AudioFocusArbiter;
use crate::player::{AudioSessionId, MediaPlayer, SourceId};
use crate::session::{
    ArtworkResolver, NowPlayingCard, NowPlayingSurface, SessionMetadata, TransportState,
};
use async_trait::async_trait;
use aura_core::{
    AlbumId, ContentHandle, PlayCountStore, SettingsStore, SongPlayCount, Track, TrackId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create a 3-minute test track whose content handle is `content://media/{id}`
pub fn track(id: i64, title: &str) -> Track {
    Track::new(
        TrackId::new(id),
        title,
        "Test Artist",
        AlbumId::new(id),
        180_000,
        ContentHandle::new(format!("content://media/{}", id)),
    )
}

/// Tracks with ids `1..` and the given titles
pub fn tracks(titles: &[&str]) -> Vec<Track> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| track(i as i64 + 1, title))
        .collect()
}

// ===== Decode primitive =====

/// Recorded decode-primitive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Reset,
    SetSource(ContentHandle),
    Prepare,
    Start,
    Pause,
    SeekTo(u64),
    Release,
}

#[derive(Debug, Default)]
struct PlayerInner {
    source: Option<ContentHandle>,
    source_id: SourceId,
    prepared: bool,
    playing: bool,
    position_ms: u64,
    session: u32,
    released: bool,
    failing_sources: HashSet<String>,
    calls: Vec<PlayerCall>,
}

/// Fake decode primitive
///
/// Position does not advance by itself; tests move it with
/// [`FakePlayer::set_position`].
#[derive(Debug, Clone, Default)]
pub struct FakePlayer {
    inner: Arc<Mutex<PlayerInner>>,
}

impl FakePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `set_source` fail for this handle
    pub fn fail_source(&self, content: &ContentHandle) {
        lock(&self.inner)
            .failing_sources
            .insert(content.as_str().to_string());
    }

    /// Make `set_source` succeed again for this handle
    pub fn heal_source(&self, content: &ContentHandle) {
        lock(&self.inner).failing_sources.remove(content.as_str());
    }

    pub fn set_position(&self, position_ms: u64) {
        lock(&self.inner).position_ms = position_ms;
    }

    /// Simulate the source playing to its end
    ///
    /// Returns the id the host would report the completion with.
    pub fn finish(&self) -> SourceId {
        let mut inner = lock(&self.inner);
        inner.playing = false;
        inner.source_id
    }

    /// Id of the most recent `set_source`
    pub fn source_id(&self) -> SourceId {
        lock(&self.inner).source_id
    }

    pub fn playing(&self) -> bool {
        lock(&self.inner).playing
    }

    pub fn position(&self) -> u64 {
        lock(&self.inner).position_ms
    }

    pub fn source(&self) -> Option<ContentHandle> {
        lock(&self.inner).source.clone()
    }

    pub fn released(&self) -> bool {
        lock(&self.inner).released
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        lock(&self.inner).calls.clone()
    }

    /// Number of `set_source` calls so far
    pub fn loads(&self) -> usize {
        lock(&self.inner)
            .calls
            .iter()
            .filter(|c| matches!(c, PlayerCall::SetSource(_)))
            .count()
    }
}

#[async_trait]
impl MediaPlayer for FakePlayer {
    fn reset(&mut self) {
        let mut inner = lock(&self.inner);
        inner.calls.push(PlayerCall::Reset);
        inner.source = None;
        inner.prepared = false;
        inner.playing = false;
        inner.position_ms = 0;
    }

    fn set_source(&mut self, content: &ContentHandle, source: SourceId) -> Result<()> {
        let mut inner = lock(&self.inner);
        inner.calls.push(PlayerCall::SetSource(content.clone()));
        inner.source_id = source;
        if inner.failing_sources.contains(content.as_str()) {
            return Err(PlaybackError::decoder(format!("cannot open {}", content)));
        }
        inner.source = Some(content.clone());
        Ok(())
    }

    async fn prepare(&mut self) -> Result<()> {
        let mut inner = lock(&self.inner);
        inner.calls.push(PlayerCall::Prepare);
        if inner.source.is_none() {
            return Err(PlaybackError::decoder("prepare without source"));
        }
        inner.prepared = true;
        inner.session += 1;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let mut inner = lock(&self.inner);
        inner.calls.push(PlayerCall::Start);
        if !inner.prepared {
            return Err(PlaybackError::decoder("start before prepare"));
        }
        inner.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut inner = lock(&self.inner);
        inner.calls.push(PlayerCall::Pause);
        inner.playing = false;
    }

    fn seek_to(&mut self, position_ms: u64) {
        let mut inner = lock(&self.inner);
        inner.calls.push(PlayerCall::SeekTo(position_ms));
        inner.position_ms = position_ms;
    }

    fn position_ms(&self) -> u64 {
        lock(&self.inner).position_ms
    }

    fn is_playing(&self) -> bool {
        lock(&self.inner).playing
    }

    fn audio_session(&self) -> Option<AudioSessionId> {
        let inner = lock(&self.inner);
        inner.prepared.then_some(AudioSessionId(inner.session))
    }

    fn release(&mut self) {
        let mut inner = lock(&self.inner);
        inner.calls.push(PlayerCall::Release);
        inner.released = true;
        inner.playing = false;
        inner.prepared = false;
    }
}

// ===== Audio focus =====

#[derive(Debug)]
struct FocusInner {
    grant: bool,
    requests: usize,
    abandons: usize,
}

/// Fake audio-focus arbiter
#[derive(Debug, Clone)]
pub struct FakeFocusArbiter {
    inner: Arc<Mutex<FocusInner>>,
}

impl FakeFocusArbiter {
    /// Arbiter that grants every request
    pub fn granting() -> Self {
        Self::with_grant(true)
    }

    /// Arbiter that denies every request
    pub fn denying() -> Self {
        Self::with_grant(false)
    }

    fn with_grant(grant: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FocusInner {
                grant,
                requests: 0,
                abandons: 0,
            })),
        }
    }

    pub fn set_grant(&self, grant: bool) {
        lock(&self.inner).grant = grant;
    }

    pub fn requests(&self) -> usize {
        lock(&self.inner).requests
    }

    pub fn abandons(&self) -> usize {
        lock(&self.inner).abandons
    }
}

impl AudioFocusArbiter for FakeFocusArbiter {
    fn request_focus(&mut self) -> bool {
        let mut inner = lock(&self.inner);
        inner.requests += 1;
        inner.grant
    }

    fn abandon_focus(&mut self) {
        lock(&self.inner).abandons += 1;
    }
}

// ===== Effects =====

/// Recorded effect call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectCall {
    Created(EffectUnit, AudioSessionId),
    Enabled(EffectUnit, bool),
    Strength(EffectUnit, u16),
    Released(EffectUnit),
}

#[derive(Debug, Default)]
struct EffectInner {
    unsupported: HashSet<EffectUnit>,
    failing_apply: HashSet<EffectUnit>,
    no_strength: bool,
    calls: Vec<EffectCall>,
}

/// Shared log of effect calls
#[derive(Debug, Clone, Default)]
pub struct EffectLog {
    inner: Arc<Mutex<EffectInner>>,
}

impl EffectLog {
    pub fn calls(&self) -> Vec<EffectCall> {
        lock(&self.inner).calls.clone()
    }

    /// Last strength applied to `unit`, if any
    pub fn last_strength(&self, unit: EffectUnit) -> Option<u16> {
        lock(&self.inner).calls.iter().rev().find_map(|c| match c {
            EffectCall::Strength(u, s) if *u == unit => Some(*s),
            _ => None,
        })
    }

    /// Last enabled flag applied to `unit`, if any
    pub fn last_enabled(&self, unit: EffectUnit) -> Option<bool> {
        lock(&self.inner).calls.iter().rev().find_map(|c| match c {
            EffectCall::Enabled(u, e) if *u == unit => Some(*e),
            _ => None,
        })
    }

    pub fn clear(&self) {
        lock(&self.inner).calls.clear();
    }

    fn record(&self, call: EffectCall) {
        lock(&self.inner).calls.push(call);
    }
}

/// Fake effect factory
#[derive(Debug, Clone, Default)]
pub struct FakeEffectFactory {
    log: EffectLog,
}

impl FakeEffectFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> EffectLog {
        self.log.clone()
    }

    /// Make construction of `unit` fail
    pub fn fail_on(&self, unit: EffectUnit) {
        lock(&self.log.inner).unsupported.insert(unit);
    }

    /// Make enable/strength calls on `unit` fail
    pub fn fail_apply_on(&self, unit: EffectUnit) {
        lock(&self.log.inner).failing_apply.insert(unit);
    }

    /// Instances report no strength support
    pub fn without_strength_support(&self) {
        lock(&self.log.inner).no_strength = true;
    }
}

impl EffectFactory for FakeEffectFactory {
    fn create(
        &mut self,
        unit: EffectUnit,
        session: AudioSessionId,
    ) -> Result<Box<dyn AudioEffect>> {
        if lock(&self.log.inner).unsupported.contains(&unit) {
            return Err(PlaybackError::effect(format!("{} not supported", unit.name())));
        }
        self.log.record(EffectCall::Created(unit, session));
        Ok(Box::new(FakeEffect {
            unit,
            log: self.log.clone(),
        }))
    }
}

struct FakeEffect {
    unit: EffectUnit,
    log: EffectLog,
}

impl FakeEffect {
    fn check(&self) -> Result<()> {
        if lock(&self.log.inner).failing_apply.contains(&self.unit) {
            return Err(PlaybackError::effect(format!("{} rejected call", self.unit.name())));
        }
        Ok(())
    }
}

impl AudioEffect for FakeEffect {
    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.check()?;
        self.log.record(EffectCall::Enabled(self.unit, enabled));
        Ok(())
    }

    fn strength_supported(&self) -> bool {
        !lock(&self.log.inner).no_strength
    }

    fn set_strength(&mut self, strength: u16) -> Result<()> {
        self.check()?;
        self.log.record(EffectCall::Strength(self.unit, strength));
        Ok(())
    }

    fn release(&mut self) {
        self.log.record(EffectCall::Released(self.unit));
    }
}

// ===== Presentation surface =====

/// Recorded surface call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Notification(NowPlayingCard),
    Metadata(SessionMetadata),
    Transport(TransportState),
    Released,
}

#[derive(Debug)]
struct SurfaceInner {
    permitted: bool,
    calls: Vec<SurfaceCall>,
}

/// Fake now-playing surface
#[derive(Debug, Clone)]
pub struct FakeSurface {
    inner: Arc<Mutex<SurfaceInner>>,
}

impl FakeSurface {
    /// Surface with notification permission granted
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SurfaceInner {
                permitted: true,
                calls: Vec::new(),
            })),
        }
    }

    pub fn set_permitted(&self, permitted: bool) {
        lock(&self.inner).permitted = permitted;
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        lock(&self.inner).calls.clone()
    }

    pub fn cards(&self) -> Vec<NowPlayingCard> {
        lock(&self.inner)
            .calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::Notification(card) => Some(card.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_card(&self) -> Option<NowPlayingCard> {
        self.cards().pop()
    }

    pub fn last_metadata(&self) -> Option<SessionMetadata> {
        lock(&self.inner).calls.iter().rev().find_map(|c| match c {
            SurfaceCall::Metadata(m) => Some(m.clone()),
            _ => None,
        })
    }

    pub fn last_transport(&self) -> Option<TransportState> {
        lock(&self.inner).calls.iter().rev().find_map(|c| match c {
            SurfaceCall::Transport(t) => Some(t.clone()),
            _ => None,
        })
    }

    pub fn released(&self) -> bool {
        lock(&self.inner)
            .calls
            .iter()
            .any(|c| matches!(c, SurfaceCall::Released))
    }
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl NowPlayingSurface for FakeSurface {
    fn notifications_permitted(&self) -> bool {
        lock(&self.inner).permitted
    }

    fn show_notification(&mut self, card: NowPlayingCard) {
        lock(&self.inner).calls.push(SurfaceCall::Notification(card));
    }

    fn set_metadata(&mut self, metadata: SessionMetadata) {
        lock(&self.inner).calls.push(SurfaceCall::Metadata(metadata));
    }

    fn set_transport_state(&mut self, state: TransportState) {
        lock(&self.inner).calls.push(SurfaceCall::Transport(state));
    }

    fn release(&mut self) {
        lock(&self.inner).calls.push(SurfaceCall::Released);
    }
}

// ===== Artwork =====

/// Fake artwork resolver
#[derive(Debug, Clone)]
pub struct FakeArtworkResolver {
    art: Option<Vec<u8>>,
    delay: Duration,
}

impl FakeArtworkResolver {
    /// Resolves every album to `art`
    pub fn with_art(art: Vec<u8>) -> Self {
        Self {
            art: Some(art),
            delay: Duration::ZERO,
        }
    }

    /// Fails every lookup
    pub fn failing() -> Self {
        Self {
            art: None,
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` (tokio time) before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ArtworkResolver for FakeArtworkResolver {
    async fn resolve(&self, album_id: AlbumId) -> Result<Vec<u8>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.art
            .clone()
            .ok_or_else(|| PlaybackError::Core(aura_core::AuraError::catalog(format!(
                "no artwork for album {}",
                album_id
            ))))
    }
}

// ===== Stores =====

/// In-memory play-count store
#[derive(Debug, Default)]
pub struct InMemoryPlayCounts {
    counts: Mutex<HashMap<TrackId, u32>>,
}

impl InMemoryPlayCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, track_id: TrackId) -> u32 {
        lock(&self.counts).get(&track_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PlayCountStore for InMemoryPlayCounts {
    async fn increment(&self, track_id: TrackId) -> aura_core::Result<()> {
        *lock(&self.counts).entry(track_id).or_default() += 1;
        Ok(())
    }

    async fn top_n(&self, limit: usize) -> aura_core::Result<Vec<SongPlayCount>> {
        let mut counts: Vec<SongPlayCount> = lock(&self.counts)
            .iter()
            .map(|(track_id, play_count)| SongPlayCount {
                track_id: *track_id,
                play_count: *play_count,
            })
            .collect();
        counts.sort_by(|a, b| {
            b.play_count
                .cmp(&a.play_count)
                .then(a.track_id.get().cmp(&b.track_id.get()))
        });
        counts.truncate(limit);
        Ok(counts)
    }
}

/// In-memory settings store
#[derive(Debug, Default)]
pub struct InMemorySettings {
    bass_strength: Mutex<Option<u16>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a previously saved strength
    pub fn with_bass_strength(strength: u16) -> Self {
        Self {
            bass_strength: Mutex::new(Some(strength)),
        }
    }

    pub fn saved(&self) -> Option<u16> {
        *lock(&self.bass_strength)
    }
}

#[async_trait]
impl SettingsStore for InMemorySettings {
    async fn bass_strength(&self) -> aura_core::Result<Option<u16>> {
        Ok(*lock(&self.bass_strength))
    }

    async fn set_bass_strength(&self, strength: u16) -> aura_core::Result<()> {
        *lock(&self.bass_strength) = Some(strength);
        Ok(())
    }
}

// ===== Bundle =====

/// Every fake, ready to be turned into [`PlaybackDeps`]
#[derive(Debug, Clone)]
pub struct FakePlatform {
    pub player: FakePlayer,
    pub focus: FakeFocusArbiter,
    pub effects: FakeEffectFactory,
    pub surface: FakeSurface,
    pub artwork: Option<FakeArtworkResolver>,
    pub play_counts: Arc<InMemoryPlayCounts>,
    pub settings: Arc<InMemorySettings>,
}

impl FakePlatform {
    /// Focus granted, every effect supported, no artwork resolver
    pub fn new() -> Self {
        Self {
            player: FakePlayer::new(),
            focus: FakeFocusArbiter::granting(),
            effects: FakeEffectFactory::new(),
            surface: FakeSurface::new(),
            artwork: None,
            play_counts: Arc::new(InMemoryPlayCounts::new()),
            settings: Arc::new(InMemorySettings::new()),
        }
    }

    pub fn with_artwork(mut self, resolver: FakeArtworkResolver) -> Self {
        self.artwork = Some(resolver);
        self
    }

    pub fn with_settings(mut self, settings: InMemorySettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    /// Dependencies sharing state with these fakes
    pub fn deps(&self) -> PlaybackDeps {
        PlaybackDeps {
            player: Box::new(self.player.clone()),
            focus: Box::new(self.focus.clone()),
            effects: Box::new(self.effects.clone()),
            surface: Box::new(self.surface.clone()),
            artwork: self
                .artwork
                .clone()
                .map(|a| Arc::new(a) as Arc<dyn ArtworkResolver>),
            play_counts: Some(Arc::clone(&self.play_counts) as Arc<dyn PlayCountStore>),
            settings: Some(Arc::clone(&self.settings) as Arc<dyn SettingsStore>),
        }
    }

    pub fn effect_log(&self) -> EffectLog {
        self.effects.log()
    }
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

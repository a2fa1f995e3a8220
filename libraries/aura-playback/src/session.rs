//! Now-playing publisher
//!
//! Pushes notification cards, media-session metadata and transport state to
//! the platform surface. Every publish is built from the truth passed in at
//! call time, never from values captured earlier.
//!
//! Artwork is resolved asynchronously. The card goes out immediately with
//! [`Artwork::Placeholder`]; the resolver task reports back on a channel tagged
//! with the generation it was started for, and the result is applied only if
//! that generation is still current and the publisher hasn't been released.

use crate::error::Result;
use crate::types::TransportAction;
use async_trait::async_trait;
use aura_core::{AlbumId, Track};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Buttons on the notification card
pub const CARD_ACTIONS: [TransportAction; 3] = [
    TransportAction::Previous,
    TransportAction::PlayPause,
    TransportAction::Next,
];

/// Actions advertised to the media session
pub const SESSION_ACTIONS: [TransportAction; 4] = [
    TransportAction::Previous,
    TransportAction::PlayPause,
    TransportAction::Next,
    TransportAction::Seek,
];

/// Album art state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Artwork {
    /// Lookup in flight
    Placeholder,

    /// Encoded image bytes
    Loaded(Vec<u8>),

    /// No artwork available
    None,
}

/// Notification payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingCard {
    /// Track title, or the fallback title
    pub title: String,

    /// Artist, or the fallback text
    pub artist: String,

    /// Album art
    pub artwork: Artwork,

    /// Actual decode-primitive playing state (drives the play/pause icon)
    pub is_playing: bool,

    /// Transport buttons
    pub actions: Vec<TransportAction>,

    /// Foreground/ongoing emphasis; only while playing
    pub ongoing: bool,
}

/// Media-session metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    /// Track title
    pub title: String,

    /// Artist
    pub artist: String,

    /// Duration in milliseconds
    pub duration_ms: u64,

    /// Album art
    pub artwork: Artwork,
}

/// Media-session playback state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportState {
    /// Playing (vs paused)
    pub is_playing: bool,

    /// Position in milliseconds
    pub position_ms: u64,

    /// Supported actions
    pub actions: Vec<TransportAction>,
}

/// Platform presentation surface (notification + media session)
///
/// All calls are fire-and-forget.
pub trait NowPlayingSurface: Send {
    /// Whether the runtime notification permission is granted
    fn notifications_permitted(&self) -> bool;

    /// Post or replace the now-playing notification
    fn show_notification(&mut self, card: NowPlayingCard);

    /// Update media-session metadata
    fn set_metadata(&mut self, metadata: SessionMetadata);

    /// Update media-session playback state
    fn set_transport_state(&mut self, state: TransportState);

    /// Release the media session and remove the notification
    fn release(&mut self);
}

/// Best-effort album art lookup
#[async_trait]
pub trait ArtworkResolver: Send + Sync {
    /// Resolve encoded artwork for `album_id`
    async fn resolve(&self, album_id: AlbumId) -> Result<Vec<u8>>;
}

/// Result of an artwork lookup, routed back to the service actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkUpdate {
    /// Generation the lookup was started for
    pub generation: u64,

    /// Resolved artwork ([`Artwork::None`] on failure)
    pub artwork: Artwork,
}

/// Current truth to publish
#[derive(Debug, Clone, Copy)]
pub struct NowPlaying<'a> {
    /// Track under the cursor
    pub track: Option<&'a Track>,

    /// Decode primitive's actual playing state
    pub is_playing: bool,

    /// Position in milliseconds
    pub position_ms: u64,
}

/// Fallback text shown when nothing is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackText {
    /// Card title
    pub title: String,

    /// Card body
    pub text: String,
}

impl Default for FallbackText {
    fn default() -> Self {
        Self {
            title: "AURA Music".to_string(),
            text: "Select a song".to_string(),
        }
    }
}

/// Publishes now-playing state to the platform surface
pub struct SessionPublisher {
    surface: Box<dyn NowPlayingSurface>,
    resolver: Option<Arc<dyn ArtworkResolver>>,
    artwork_tx: mpsc::UnboundedSender<ArtworkUpdate>,
    fallback: FallbackText,
    generation: u64,
    artwork: Artwork,
    alive: bool,
}

impl SessionPublisher {
    /// Create publisher
    ///
    /// Artwork results are sent on `artwork_tx`; the owner feeds them back
    /// through [`SessionPublisher::apply_artwork`].
    pub fn new(
        surface: Box<dyn NowPlayingSurface>,
        resolver: Option<Arc<dyn ArtworkResolver>>,
        artwork_tx: mpsc::UnboundedSender<ArtworkUpdate>,
        fallback: FallbackText,
    ) -> Self {
        Self {
            surface,
            resolver,
            artwork_tx,
            fallback,
            generation: 0,
            artwork: Artwork::None,
            alive: true,
        }
    }

    /// Track changed: publish metadata, card and transport, start artwork lookup
    ///
    /// Must be called from within a tokio runtime when a resolver is set.
    pub fn track_changed(&mut self, now: NowPlaying<'_>) {
        if !self.alive {
            return;
        }

        self.generation += 1;
        self.artwork = match (now.track, &self.resolver) {
            (Some(_), Some(_)) => Artwork::Placeholder,
            _ => Artwork::None,
        };

        self.publish_metadata(now);
        self.publish_card(now);
        self.publish_transport(now);

        if let (Some(track), Some(resolver)) = (now.track, &self.resolver) {
            let resolver = Arc::clone(resolver);
            let tx = self.artwork_tx.clone();
            let generation = self.generation;
            let album_id = track.album_id;

            tokio::spawn(async move {
                let artwork = match resolver.resolve(album_id).await {
                    Ok(bytes) => Artwork::Loaded(bytes),
                    Err(e) => {
                        tracing::debug!(album_id = album_id.get(), error = %e, "Artwork lookup failed");
                        Artwork::None
                    }
                };
                // Receiver gone means the service shut down
                let _ = tx.send(ArtworkUpdate { generation, artwork });
            });
        }
    }

    /// Play/pause or other non-track transition: republish card and transport
    pub fn state_changed(&mut self, now: NowPlaying<'_>) {
        if !self.alive {
            return;
        }
        self.publish_card(now);
        self.publish_transport(now);
    }

    /// Poll tick: republish transport state only
    pub fn position_changed(&mut self, now: NowPlaying<'_>) {
        if !self.alive {
            return;
        }
        self.publish_transport(now);
    }

    /// Apply an artwork lookup result
    ///
    /// Returns `false` (and publishes nothing) for stale generations or after
    /// release.
    pub fn apply_artwork(&mut self, update: ArtworkUpdate, now: NowPlaying<'_>) -> bool {
        if !self.alive || update.generation != self.generation {
            tracing::debug!(
                generation = update.generation,
                current = self.generation,
                "Dropping stale artwork"
            );
            return false;
        }

        self.artwork = update.artwork;
        self.publish_metadata(now);
        self.publish_card(now);
        true
    }

    /// Release the surface; later calls are no-ops
    pub fn release(&mut self) {
        if std::mem::replace(&mut self.alive, false) {
            self.surface.release();
        }
    }

    /// Generation of the latest track change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Artwork for the current generation
    pub fn artwork(&self) -> &Artwork {
        &self.artwork
    }

    fn publish_card(&mut self, now: NowPlaying<'_>) {
        if !self.surface.notifications_permitted() {
            tracing::trace!("Notification permission missing, skipping card");
            return;
        }

        let card = match now.track {
            Some(track) => NowPlayingCard {
                title: track.title.clone(),
                artist: track.artist.clone(),
                artwork: self.artwork.clone(),
                is_playing: now.is_playing,
                actions: CARD_ACTIONS.to_vec(),
                ongoing: now.is_playing,
            },
            None => NowPlayingCard {
                title: self.fallback.title.clone(),
                artist: self.fallback.text.clone(),
                artwork: Artwork::None,
                is_playing: false,
                actions: CARD_ACTIONS.to_vec(),
                ongoing: false,
            },
        };
        self.surface.show_notification(card);
    }

    fn publish_metadata(&mut self, now: NowPlaying<'_>) {
        let Some(track) = now.track else {
            return;
        };

        self.surface.set_metadata(SessionMetadata {
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration_ms: track.duration_ms,
            artwork: self.artwork.clone(),
        });
    }

    fn publish_transport(&mut self, now: NowPlaying<'_>) {
        self.surface.set_transport_state(TransportState {
            is_playing: now.is_playing,
            position_ms: now.position_ms,
            actions: SESSION_ACTIONS.to_vec(),
        });
    }
}

impl std::fmt::Debug for SessionPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPublisher")
            .field("generation", &self.generation)
            .field("artwork", &self.artwork)
            .field("alive", &self.alive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeArtworkResolver, FakeSurface, SurfaceCall};
    use aura_core::{ContentHandle, TrackId};

    fn track(id: i64, title: &str) -> Track {
        Track::new(
            TrackId::new(id),
            title,
            "Artist",
            AlbumId::new(id),
            200_000,
            ContentHandle::new(format!("content://media/{}", id)),
        )
    }

    fn playing(track: &Track) -> NowPlaying<'_> {
        NowPlaying {
            track: Some(track),
            is_playing: true,
            position_ms: 0,
        }
    }

    #[tokio::test]
    async fn placeholder_first_then_loaded_artwork() {
        let surface = FakeSurface::new();
        let observer = surface.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let resolver = Arc::new(FakeArtworkResolver::with_art(vec![1, 2, 3]));
        let mut publisher =
            SessionPublisher::new(Box::new(surface), Some(resolver), tx, FallbackText::default());

        let a = track(1, "A");
        publisher.track_changed(playing(&a));
        assert_eq!(observer.last_card().unwrap().artwork, Artwork::Placeholder);

        let update = rx.recv().await.unwrap();
        assert!(publisher.apply_artwork(update, playing(&a)));
        assert_eq!(
            observer.last_card().unwrap().artwork,
            Artwork::Loaded(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn failed_artwork_still_republishes_once() {
        let surface = FakeSurface::new();
        let observer = surface.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let resolver = Arc::new(FakeArtworkResolver::failing());
        let mut publisher =
            SessionPublisher::new(Box::new(surface), Some(resolver), tx, FallbackText::default());

        let a = track(1, "A");
        publisher.track_changed(playing(&a));
        let cards_before = observer.cards().len();

        let update = rx.recv().await.unwrap();
        assert_eq!(update.artwork, Artwork::None);
        publisher.apply_artwork(update, playing(&a));

        assert_eq!(observer.cards().len(), cards_before + 1);
        assert_eq!(observer.last_card().unwrap().artwork, Artwork::None);
    }

    #[tokio::test]
    async fn stale_artwork_is_dropped() {
        let surface = FakeSurface::new();
        let observer = surface.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let resolver = Arc::new(FakeArtworkResolver::with_art(vec![9]));
        let mut publisher =
            SessionPublisher::new(Box::new(surface), Some(resolver), tx, FallbackText::default());

        let a = track(1, "A");
        let b = track(2, "B");
        publisher.track_changed(playing(&a));
        publisher.track_changed(playing(&b));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        let (stale, fresh) = if first.generation == 1 {
            (first, second)
        } else {
            (second, first)
        };

        assert!(!publisher.apply_artwork(stale, playing(&b)));
        assert_eq!(observer.last_card().unwrap().title, "B");
        assert_eq!(observer.last_card().unwrap().artwork, Artwork::Placeholder);

        assert!(publisher.apply_artwork(fresh, playing(&b)));
        assert_eq!(observer.last_card().unwrap().title, "B");
    }

    #[tokio::test]
    async fn released_publisher_ignores_everything() {
        let surface = FakeSurface::new();
        let observer = surface.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let resolver = Arc::new(FakeArtworkResolver::with_art(vec![9]));
        let mut publisher =
            SessionPublisher::new(Box::new(surface), Some(resolver), tx, FallbackText::default());

        let a = track(1, "A");
        publisher.track_changed(playing(&a));
        publisher.release();
        publisher.release();

        let update = rx.recv().await.unwrap();
        let calls_before = observer.calls().len();
        assert!(!publisher.apply_artwork(update, playing(&a)));
        publisher.state_changed(playing(&a));
        assert_eq!(observer.calls().len(), calls_before);
        assert_eq!(
            observer
                .calls()
                .iter()
                .filter(|c| matches!(c, SurfaceCall::Released))
                .count(),
            1
        );
    }

    #[test]
    fn missing_permission_suppresses_cards_only() {
        let surface = FakeSurface::new();
        surface.set_permitted(false);
        let observer = surface.clone();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut publisher = SessionPublisher::new(Box::new(surface), None, tx, FallbackText::default());

        let a = track(1, "A");
        publisher.track_changed(playing(&a));

        assert!(observer.cards().is_empty());
        assert!(observer
            .calls()
            .iter()
            .any(|c| matches!(c, SurfaceCall::Metadata(_))));
    }

    #[test]
    fn fallback_card_without_track() {
        let surface = FakeSurface::new();
        let observer = surface.clone();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut publisher = SessionPublisher::new(Box::new(surface), None, tx, FallbackText::default());

        publisher.state_changed(NowPlaying {
            track: None,
            is_playing: false,
            position_ms: 0,
        });

        let card = observer.last_card().unwrap();
        assert_eq!(card.title, "AURA Music");
        assert_eq!(card.artist, "Select a song");
        assert!(!card.ongoing);
    }

    #[test]
    fn card_reflects_actual_playing_state() {
        let surface = FakeSurface::new();
        let observer = surface.clone();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut publisher = SessionPublisher::new(Box::new(surface), None, tx, FallbackText::default());

        let a = track(1, "A");
        publisher.state_changed(NowPlaying {
            track: Some(&a),
            is_playing: false,
            position_ms: 1200,
        });

        let card = observer.last_card().unwrap();
        assert!(!card.is_playing);
        assert!(!card.ongoing);
        assert_eq!(card.actions, CARD_ACTIONS.to_vec());
    }
}

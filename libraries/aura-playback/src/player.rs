//! Platform-agnostic decode primitive
//!
//! Abstracts the platform media player so the controller can drive it the same
//! way on every host (and against fakes in tests).

use crate::error::Result;
use async_trait::async_trait;
use aura_core::ContentHandle;

/// Audio session handle effects attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioSessionId(pub u32);

/// Identity of one source load
///
/// Issued fresh for every `set_source`. The host echoes it back with the
/// completion or decode error of that load, so callbacks that arrive after
/// the source was replaced are recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceId(pub u64);

/// Decode primitive: opens a track handle and produces audible output
///
/// Completion and decode errors are not returned from these calls; the host
/// reports them asynchronously through [`crate::PlatformNotifier`], tagged
/// with the [`SourceId`] given to `set_source`.
#[async_trait]
pub trait MediaPlayer: Send {
    /// Drop the current source and return to the idle state
    fn reset(&mut self);

    /// Point the player at a new content handle
    ///
    /// Callbacks for this load must carry `source`.
    ///
    /// # Returns
    /// * `Ok(())` - Source accepted
    /// * `Err(_)` - Handle could not be opened
    fn set_source(&mut self, content: &ContentHandle, source: SourceId) -> Result<()>;

    /// Prepare the source for playback
    ///
    /// Only asynchronous step of a track load.
    async fn prepare(&mut self) -> Result<()>;

    /// Start or resume output
    fn start(&mut self) -> Result<()>;

    /// Pause output, keeping position
    fn pause(&mut self);

    /// Seek within the prepared source
    fn seek_to(&mut self, position_ms: u64);

    /// Current position in milliseconds
    fn position_ms(&self) -> u64;

    /// Whether audio is actually being produced right now
    fn is_playing(&self) -> bool;

    /// Session handle of the prepared source, if any
    fn audio_session(&self) -> Option<AudioSessionId>;

    /// Release the underlying platform resources
    fn release(&mut self);
}

//! Effects rack
//!
//! Three effect instances scoped to the current decode session:
//!
//! - **Environmental reverb** and **virtualizer**, toggled together as the
//!   "spatial" effect
//! - **Bass boost**, with a 0-1000 strength
//!
//! Instances are released and rebuilt on every track change. Each slot is built
//! independently, so one unsupported effect never blocks the others. Whether an
//! effect *should* be on lives in [`EffectSettings`], separately from whether
//! its instance exists.

use crate::error::Result;
use crate::player::AudioSessionId;
use crate::types::EffectSettings;
use std::fmt;

/// Reverb level (millibels) for spatial mode
pub const REVERB_LEVEL_MB: i16 = -2000;

/// Room level (millibels) for spatial mode
pub const ROOM_LEVEL_MB: i16 = -1000;

/// Virtualizer strength applied when the instance supports it
pub const VIRTUALIZER_STRENGTH: u16 = 1000;

/// Effect to construct, with its construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectUnit {
    /// Environmental reverb
    EnvironmentalReverb {
        /// Reverb level in millibels
        reverb_level_mb: i16,
        /// Room level in millibels
        room_level_mb: i16,
    },

    /// Stereo virtualizer
    Virtualizer,

    /// Bass boost
    BassBoost,
}

impl EffectUnit {
    /// Reverb used for spatial mode
    pub const SPATIAL_REVERB: Self = Self::EnvironmentalReverb {
        reverb_level_mb: REVERB_LEVEL_MB,
        room_level_mb: ROOM_LEVEL_MB,
    };

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnvironmentalReverb { .. } => "reverb",
            Self::Virtualizer => "virtualizer",
            Self::BassBoost => "bass_boost",
        }
    }
}

/// Live effect instance bound to one audio session
pub trait AudioEffect: Send {
    /// Enable or disable processing
    fn set_enabled(&mut self, enabled: bool) -> Result<()>;

    /// Whether [`AudioEffect::set_strength`] is supported on this device
    fn strength_supported(&self) -> bool;

    /// Set effect strength (0-1000)
    fn set_strength(&mut self, strength: u16) -> Result<()>;

    /// Release platform resources
    fn release(&mut self);
}

/// Constructs effect instances for a decode session
///
/// Construction may fail per effect (e.g. unsupported on the device).
pub trait EffectFactory: Send {
    /// Construct `unit` attached to `session`
    fn create(&mut self, unit: EffectUnit, session: AudioSessionId)
        -> Result<Box<dyn AudioEffect>>;
}

/// One effect position in the rack
pub enum EffectSlot {
    /// No live instance (not built yet, construction failed, or released)
    Unavailable,

    /// Live instance
    Available(Box<dyn AudioEffect>),
}

impl EffectSlot {
    /// Check if a live instance exists
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Release the instance, if any; idempotent
    pub fn release(&mut self) {
        if let Self::Available(mut effect) = std::mem::replace(self, Self::Unavailable) {
            effect.release();
        }
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        match self {
            Self::Available(effect) => effect.set_enabled(enabled),
            Self::Unavailable => Ok(()),
        }
    }

    fn set_strength(&mut self, strength: u16) -> Result<()> {
        match self {
            Self::Available(effect) if effect.strength_supported() => {
                effect.set_strength(strength)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for EffectSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("Unavailable"),
            Self::Available(_) => f.write_str("Available"),
        }
    }
}

/// Effect instances for the current decode session
pub struct EffectsRack {
    factory: Box<dyn EffectFactory>,
    reverb: EffectSlot,
    virtualizer: EffectSlot,
    bass_boost: EffectSlot,
}

impl EffectsRack {
    /// Create an empty rack; no instances exist until [`EffectsRack::rebuild`]
    pub fn new(factory: Box<dyn EffectFactory>) -> Self {
        Self {
            factory,
            reverb: EffectSlot::Unavailable,
            virtualizer: EffectSlot::Unavailable,
            bass_boost: EffectSlot::Unavailable,
        }
    }

    /// Release every instance and construct fresh ones for `session`
    ///
    /// Persisted flags and strength are reapplied to whichever instances were
    /// built. Failures are logged, never returned.
    pub fn rebuild(&mut self, session: Option<AudioSessionId>, settings: &EffectSettings) {
        self.release_all();

        let Some(session) = session else {
            tracing::debug!("No audio session, effects unavailable");
            return;
        };

        self.reverb = self.construct(EffectUnit::SPATIAL_REVERB, session);
        self.virtualizer = self.construct(EffectUnit::Virtualizer, session);
        self.bass_boost = self.construct(EffectUnit::BassBoost, session);

        if let Err(e) = self.virtualizer.set_strength(VIRTUALIZER_STRENGTH) {
            tracing::warn!(error = %e, "Failed to set virtualizer strength");
        }

        if let Err(e) = self.apply_spatial(settings.spatial_enabled) {
            tracing::warn!(error = %e, "Failed to reapply spatial mode");
        }
        if let Err(e) = self.apply_bass_strength(settings.bass_strength) {
            tracing::warn!(error = %e, "Failed to reapply bass strength");
        }
        if let Err(e) = self.apply_bass_boost(settings.bass_boost_enabled) {
            tracing::warn!(error = %e, "Failed to reapply bass boost");
        }
    }

    fn construct(&mut self, unit: EffectUnit, session: AudioSessionId) -> EffectSlot {
        match self.factory.create(unit, session) {
            Ok(effect) => EffectSlot::Available(effect),
            Err(e) => {
                tracing::warn!(effect = unit.name(), error = %e, "Effect unavailable");
                EffectSlot::Unavailable
            }
        }
    }

    /// Enable/disable reverb and virtualizer together
    ///
    /// Both instances are attempted even if the first fails; the first error
    /// is returned.
    pub fn apply_spatial(&mut self, enabled: bool) -> Result<()> {
        let reverb = self.reverb.set_enabled(enabled);
        let virtualizer = self.virtualizer.set_enabled(enabled);
        reverb.and(virtualizer)
    }

    /// Enable/disable bass boost
    pub fn apply_bass_boost(&mut self, enabled: bool) -> Result<()> {
        self.bass_boost.set_enabled(enabled)
    }

    /// Apply bass strength when the instance supports it
    pub fn apply_bass_strength(&mut self, strength: u16) -> Result<()> {
        self.bass_boost.set_strength(strength)
    }

    /// Release all instances; idempotent
    pub fn release_all(&mut self) {
        self.reverb.release();
        self.virtualizer.release();
        self.bass_boost.release();
    }

    /// Check whether the instance for `unit` is live
    pub fn is_available(&self, unit: EffectUnit) -> bool {
        match unit {
            EffectUnit::EnvironmentalReverb { .. } => self.reverb.is_available(),
            EffectUnit::Virtualizer => self.virtualizer.is_available(),
            EffectUnit::BassBoost => self.bass_boost.is_available(),
        }
    }
}

impl fmt::Debug for EffectsRack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectsRack")
            .field("reverb", &self.reverb)
            .field("virtualizer", &self.virtualizer)
            .field("bass_boost", &self.bass_boost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EffectCall, FakeEffectFactory};

    const SESSION: AudioSessionId = AudioSessionId(7);

    #[test]
    fn rebuild_constructs_and_reapplies() {
        let factory = FakeEffectFactory::new();
        let log = factory.log();
        let mut rack = EffectsRack::new(Box::new(factory));

        let settings = EffectSettings {
            spatial_enabled: true,
            bass_boost_enabled: true,
            bass_strength: 400,
        };
        rack.rebuild(Some(SESSION), &settings);

        assert!(rack.is_available(EffectUnit::SPATIAL_REVERB));
        assert!(rack.is_available(EffectUnit::Virtualizer));
        assert!(rack.is_available(EffectUnit::BassBoost));

        let calls = log.calls();
        assert!(calls.contains(&EffectCall::Created(EffectUnit::SPATIAL_REVERB, SESSION)));
        assert!(calls.contains(&EffectCall::Strength(EffectUnit::Virtualizer, 1000)));
        assert!(calls.contains(&EffectCall::Enabled(EffectUnit::SPATIAL_REVERB, true)));
        assert!(calls.contains(&EffectCall::Strength(EffectUnit::BassBoost, 400)));
        assert!(calls.contains(&EffectCall::Enabled(EffectUnit::BassBoost, true)));
    }

    #[test]
    fn one_failed_construction_does_not_block_others() {
        let factory = FakeEffectFactory::new();
        factory.fail_on(EffectUnit::Virtualizer);
        let mut rack = EffectsRack::new(Box::new(factory));

        rack.rebuild(Some(SESSION), &EffectSettings::default());

        assert!(rack.is_available(EffectUnit::SPATIAL_REVERB));
        assert!(!rack.is_available(EffectUnit::Virtualizer));
        assert!(rack.is_available(EffectUnit::BassBoost));
        assert!(rack.apply_spatial(true).is_ok());
    }

    #[test]
    fn rebuild_releases_previous_instances() {
        let factory = FakeEffectFactory::new();
        let log = factory.log();
        let mut rack = EffectsRack::new(Box::new(factory));

        rack.rebuild(Some(SESSION), &EffectSettings::default());
        rack.rebuild(Some(AudioSessionId(8)), &EffectSettings::default());

        let released = log
            .calls()
            .iter()
            .filter(|c| matches!(c, EffectCall::Released(_)))
            .count();
        assert_eq!(released, 3);
    }

    #[test]
    fn unsupported_strength_is_skipped() {
        let factory = FakeEffectFactory::new();
        factory.without_strength_support();
        let log = factory.log();
        let mut rack = EffectsRack::new(Box::new(factory));

        rack.rebuild(Some(SESSION), &EffectSettings::with_bass_strength(500));

        assert!(!log
            .calls()
            .iter()
            .any(|c| matches!(c, EffectCall::Strength(..))));
    }

    #[test]
    fn no_session_leaves_everything_unavailable() {
        let mut rack = EffectsRack::new(Box::new(FakeEffectFactory::new()));
        rack.rebuild(None, &EffectSettings::default());
        assert!(!rack.is_available(EffectUnit::BassBoost));
        assert!(rack.apply_bass_boost(true).is_ok());
        rack.release_all();
        rack.release_all();
    }
}

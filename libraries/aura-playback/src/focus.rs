//! Audio focus coordination
//!
//! Tracks whether we hold platform audio focus and translates focus changes
//! into pause/resume decisions for the controller.
//!
//! A granted request stays registered with the platform through losses (that
//! registration is what delivers the later `Gain`) until it is abandoned.

use serde::{Deserialize, Serialize};

/// Platform audio-focus arbiter
pub trait AudioFocusArbiter: Send {
    /// Request focus for media playback; `true` if granted
    fn request_focus(&mut self) -> bool;

    /// Give focus back to the platform
    fn abandon_focus(&mut self);
}

/// Focus change reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusChange {
    /// Focus (re)gained
    Gain,

    /// Permanent loss (another app took over)
    Loss,

    /// Temporary loss (call, navigation prompt)
    LossTransient,

    /// Temporary loss where ducking would be allowed
    ///
    /// Handled exactly like [`FocusChange::LossTransient`]: we pause rather
    /// than attenuate.
    LossTransientCanDuck,
}

/// What the controller should do in response to a focus change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusAction {
    /// Pause playback
    Pause,

    /// Resume playback paused by a transient loss
    Resume,

    /// Nothing to do
    Ignore,
}

/// Audio focus state machine
pub struct FocusCoordinator {
    arbiter: Box<dyn AudioFocusArbiter>,
    /// A granted request not yet abandoned
    registered: bool,
    /// We may produce sound right now
    held: bool,
    resume_on_gain: bool,
}

impl FocusCoordinator {
    /// Create coordinator; focus is not held initially
    pub fn new(arbiter: Box<dyn AudioFocusArbiter>) -> Self {
        Self {
            arbiter,
            registered: false,
            held: false,
            resume_on_gain: false,
        }
    }

    /// Ensure focus is held before playback starts
    ///
    /// Idempotent while focus is held. Returns `false` when the platform
    /// denies the request.
    pub fn request(&mut self) -> bool {
        if self.held {
            return true;
        }

        self.held = self.arbiter.request_focus();
        if self.held {
            self.registered = true;
        } else {
            tracing::warn!("Audio focus denied");
        }
        self.held
    }

    /// Handle a platform focus change
    pub fn on_change(&mut self, change: FocusChange, is_playing: bool) -> FocusAction {
        tracing::debug!(?change, is_playing, "Audio focus changed");

        match change {
            FocusChange::Gain => {
                self.held = true;
                if std::mem::take(&mut self.resume_on_gain) {
                    FocusAction::Resume
                } else {
                    FocusAction::Ignore
                }
            }
            FocusChange::Loss => {
                self.held = false;
                self.resume_on_gain = false;
                if is_playing {
                    FocusAction::Pause
                } else {
                    FocusAction::Ignore
                }
            }
            FocusChange::LossTransient | FocusChange::LossTransientCanDuck => {
                self.held = false;
                self.resume_on_gain = is_playing;
                if is_playing {
                    FocusAction::Pause
                } else {
                    FocusAction::Ignore
                }
            }
        }
    }

    /// Forget a pending auto-resume (the user paused explicitly)
    pub fn clear_pending_resume(&mut self) {
        self.resume_on_gain = false;
    }

    /// Abandon the focus request, if one is registered
    ///
    /// Also covers a request whose focus is currently lost.
    pub fn abandon(&mut self) {
        if self.registered {
            self.arbiter.abandon_focus();
        }
        self.registered = false;
        self.held = false;
        self.resume_on_gain = false;
    }

    /// Whether focus is currently held
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Whether a granted request is still registered with the platform
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Whether a focus gain would resume playback
    pub fn resume_pending(&self) -> bool {
        self.resume_on_gain
    }
}

impl std::fmt::Debug for FocusCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusCoordinator")
            .field("registered", &self.registered)
            .field("held", &self.held)
            .field("resume_on_gain", &self.resume_on_gain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFocusArbiter;

    #[test]
    fn request_is_idempotent_while_held() {
        let arbiter = FakeFocusArbiter::granting();
        let observer = arbiter.clone();
        let mut focus = FocusCoordinator::new(Box::new(arbiter));

        assert!(focus.request());
        assert!(focus.request());
        assert_eq!(observer.requests(), 1);
    }

    #[test]
    fn denied_request_is_retried() {
        let arbiter = FakeFocusArbiter::denying();
        let observer = arbiter.clone();
        let mut focus = FocusCoordinator::new(Box::new(arbiter));

        assert!(!focus.request());
        observer.set_grant(true);
        assert!(focus.request());
        assert_eq!(observer.requests(), 2);
    }

    #[test]
    fn permanent_loss_never_resumes() {
        let mut focus = FocusCoordinator::new(Box::new(FakeFocusArbiter::granting()));
        focus.request();

        assert_eq!(focus.on_change(FocusChange::Loss, true), FocusAction::Pause);
        assert_eq!(focus.on_change(FocusChange::Gain, false), FocusAction::Ignore);
    }

    #[test]
    fn transient_loss_resumes_once() {
        for loss in [FocusChange::LossTransient, FocusChange::LossTransientCanDuck] {
            let mut focus = FocusCoordinator::new(Box::new(FakeFocusArbiter::granting()));
            focus.request();

            assert_eq!(focus.on_change(loss, true), FocusAction::Pause);
            assert!(focus.resume_pending());
            assert_eq!(focus.on_change(FocusChange::Gain, false), FocusAction::Resume);
            assert_eq!(focus.on_change(FocusChange::Gain, true), FocusAction::Ignore);
        }
    }

    #[test]
    fn transient_loss_while_paused_does_not_resume() {
        let mut focus = FocusCoordinator::new(Box::new(FakeFocusArbiter::granting()));
        assert_eq!(
            focus.on_change(FocusChange::LossTransient, false),
            FocusAction::Ignore
        );
        assert_eq!(focus.on_change(FocusChange::Gain, false), FocusAction::Ignore);
    }

    #[test]
    fn abandon_only_when_requested() {
        let arbiter = FakeFocusArbiter::granting();
        let observer = arbiter.clone();
        let mut focus = FocusCoordinator::new(Box::new(arbiter));

        focus.abandon();
        assert_eq!(observer.abandons(), 0);

        focus.request();
        focus.abandon();
        focus.abandon();
        assert_eq!(observer.abandons(), 1);
        assert!(!focus.is_held());
    }

    #[test]
    fn denied_request_is_not_abandoned() {
        let arbiter = FakeFocusArbiter::denying();
        let observer = arbiter.clone();
        let mut focus = FocusCoordinator::new(Box::new(arbiter));

        assert!(!focus.request());
        focus.abandon();
        assert_eq!(observer.abandons(), 0);
    }

    #[test]
    fn abandon_after_loss_releases_registration() {
        for loss in [
            FocusChange::Loss,
            FocusChange::LossTransient,
            FocusChange::LossTransientCanDuck,
        ] {
            let arbiter = FakeFocusArbiter::granting();
            let observer = arbiter.clone();
            let mut focus = FocusCoordinator::new(Box::new(arbiter));

            focus.request();
            focus.on_change(loss, true);
            assert!(!focus.is_held());
            assert!(focus.is_registered());

            focus.abandon();
            assert_eq!(observer.abandons(), 1, "{:?}", loss);
            assert!(!focus.is_registered());
        }
    }
}

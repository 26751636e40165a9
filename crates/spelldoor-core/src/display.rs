#![forbid(unsafe_code)]

//! Key display fade lifecycle.
//!
//! ```text
//!            show            hold elapsed         fade elapsed
//! Hidden ──────────▶ Visible ────────────▶ FadingOut ────────────▶ Hidden
//!                    ▲  │ show                 │ show
//!                    └──┴──────────────────────┘
//! ```
//!
//! The machine owns a single pending-timer record. Every transition that
//! schedules a timer first cancels the previous one, so at most one timer is
//! live at a time. The host maps [`TimerToken`]s to its own timer handles;
//! a token that fires after being superseded is ignored.

use core::time::Duration;

use tracing::trace;

use crate::config::SpellConfig;
use crate::key::KeyLabel;

/// Visual state of the key display element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Hidden,
    /// Fully visible, waiting for the hold timer.
    Visible,
    /// Fade-out class applied, waiting for the fade timer.
    FadingOut,
}

impl DisplayState {
    /// Whether the element carries the `visible` class.
    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Visible | Self::FadingOut)
    }

    /// Whether the element carries the `is-fading-out` class.
    #[must_use]
    pub const fn is_fading(self) -> bool {
        matches!(self, Self::FadingOut)
    }
}

/// Host-visible identity of one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Which of the two chained timers a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeTimer {
    Hold,
    FadeOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub token: TimerToken,
    pub timer: FadeTimer,
    pub delay: Duration,
}

/// Effect the host applies to the DOM or its timer table, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEffect {
    SetText(String),
    Apply(DisplayState),
    CancelTimer(TimerToken),
    ScheduleTimer(TimerRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    token: TimerToken,
    timer: FadeTimer,
}

/// Show/hold/fade state machine for the last pressed key.
#[derive(Debug, Clone)]
pub struct FadeLifecycle {
    hold_delay: Duration,
    fade_out_delay: Duration,
    state: DisplayState,
    text: Option<String>,
    pending: Option<PendingTimer>,
    next_token: u64,
}

impl FadeLifecycle {
    #[must_use]
    pub const fn new(hold_delay: Duration, fade_out_delay: Duration) -> Self {
        Self {
            hold_delay,
            fade_out_delay,
            state: DisplayState::Hidden,
            text: None,
            pending: None,
            next_token: 1,
        }
    }

    #[must_use]
    pub const fn from_config(config: &SpellConfig) -> Self {
        Self::new(config.hold_delay(), config.fade_out_delay())
    }

    #[must_use]
    pub const fn state(&self) -> DisplayState {
        self.state
    }

    /// Text currently in the pressed-key label. Kept after the display hides.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The one live timer, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<(TimerToken, FadeTimer)> {
        self.pending.map(|pending| (pending.token, pending.timer))
    }

    /// Display a new key and restart the hold period.
    pub fn show(&mut self, label: &KeyLabel) -> Vec<DisplayEffect> {
        let text = label.display_text();
        let mut effects = Vec::with_capacity(4);
        effects.push(DisplayEffect::SetText(text.clone()));
        self.text = Some(text);

        if let Some(pending) = self.pending.take() {
            effects.push(DisplayEffect::CancelTimer(pending.token));
        }
        self.state = DisplayState::Visible;
        effects.push(DisplayEffect::Apply(self.state));
        effects.push(DisplayEffect::ScheduleTimer(
            self.schedule(FadeTimer::Hold, self.hold_delay),
        ));
        effects
    }

    /// Advance the machine for a fired timer. Superseded tokens yield no effects.
    pub fn timer_elapsed(&mut self, token: TimerToken) -> Vec<DisplayEffect> {
        let Some(pending) = self.pending.filter(|pending| pending.token == token) else {
            trace!(token = token.get(), "stale fade timer ignored");
            return Vec::new();
        };
        self.pending = None;

        match pending.timer {
            FadeTimer::Hold => {
                self.state = DisplayState::FadingOut;
                trace!(token = token.get(), "key display fading out");
                vec![
                    DisplayEffect::Apply(self.state),
                    DisplayEffect::ScheduleTimer(
                        self.schedule(FadeTimer::FadeOut, self.fade_out_delay),
                    ),
                ]
            }
            FadeTimer::FadeOut => {
                self.state = DisplayState::Hidden;
                trace!(token = token.get(), "key display hidden");
                vec![DisplayEffect::Apply(self.state)]
            }
        }
    }

    fn schedule(&mut self, timer: FadeTimer, delay: Duration) -> TimerRequest {
        let token = TimerToken(self.next_token);
        self.next_token = self.next_token.saturating_add(1);
        self.pending = Some(PendingTimer { token, timer });
        TimerRequest {
            token,
            timer,
            delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lifecycle() -> FadeLifecycle {
        FadeLifecycle::new(Duration::from_millis(500), Duration::from_millis(3000))
    }

    fn label(key: &str) -> KeyLabel {
        KeyLabel::from_dom(key).expect("valid label")
    }

    fn scheduled(effects: &[DisplayEffect]) -> TimerRequest {
        effects
            .iter()
            .find_map(|effect| match effect {
                DisplayEffect::ScheduleTimer(request) => Some(*request),
                _ => None,
            })
            .expect("effects should schedule a timer")
    }

    #[test]
    fn starts_hidden_with_no_timer() {
        let fade = lifecycle();
        assert_eq!(fade.state(), DisplayState::Hidden);
        assert_eq!(fade.pending_timer(), None);
        assert_eq!(fade.text(), None);
    }

    #[test]
    fn show_sets_lowercase_text_and_schedules_hold() {
        let mut fade = lifecycle();
        let effects = fade.show(&label("Q"));
        assert_eq!(
            effects,
            vec![
                DisplayEffect::SetText("q".to_owned()),
                DisplayEffect::Apply(DisplayState::Visible),
                DisplayEffect::ScheduleTimer(TimerRequest {
                    token: TimerToken(1),
                    timer: FadeTimer::Hold,
                    delay: Duration::from_millis(500),
                }),
            ]
        );
        assert_eq!(fade.state(), DisplayState::Visible);
    }

    #[test]
    fn full_cycle_returns_to_hidden() {
        let mut fade = lifecycle();
        let hold = scheduled(&fade.show(&label("f")));

        let effects = fade.timer_elapsed(hold.token);
        assert_eq!(fade.state(), DisplayState::FadingOut);
        let fade_out = scheduled(&effects);
        assert_eq!(fade_out.timer, FadeTimer::FadeOut);
        assert_eq!(fade_out.delay, Duration::from_millis(3000));

        let effects = fade.timer_elapsed(fade_out.token);
        assert_eq!(effects, vec![DisplayEffect::Apply(DisplayState::Hidden)]);
        assert_eq!(fade.state(), DisplayState::Hidden);
        assert_eq!(fade.pending_timer(), None);
        assert_eq!(fade.text(), Some("f"));
    }

    #[test]
    fn second_press_during_hold_cancels_and_restarts() {
        let mut fade = lifecycle();
        let first = scheduled(&fade.show(&label("f")));
        let effects = fade.show(&label("r"));

        assert!(effects.contains(&DisplayEffect::CancelTimer(first.token)));
        let second = scheduled(&effects);
        assert_ne!(first.token, second.token);
        assert_eq!(second.timer, FadeTimer::Hold);
        assert_eq!(fade.state(), DisplayState::Visible);
        assert_eq!(fade.text(), Some("r"));

        // The superseded hold timer firing late changes nothing.
        assert!(fade.timer_elapsed(first.token).is_empty());
        assert_eq!(fade.state(), DisplayState::Visible);
    }

    #[test]
    fn press_during_fade_out_restores_visible() {
        let mut fade = lifecycle();
        let hold = scheduled(&fade.show(&label("f")));
        let fade_out = scheduled(&fade.timer_elapsed(hold.token));
        assert_eq!(fade.state(), DisplayState::FadingOut);

        let effects = fade.show(&label("i"));
        assert!(effects.contains(&DisplayEffect::CancelTimer(fade_out.token)));
        assert!(effects.contains(&DisplayEffect::Apply(DisplayState::Visible)));
        assert!(fade.timer_elapsed(fade_out.token).is_empty());
        assert_eq!(fade.state(), DisplayState::Visible);
    }

    #[test]
    fn at_most_one_timer_is_pending() {
        let mut fade = lifecycle();
        for key in ["f", "r", "i", "e", "n", "d"] {
            fade.show(&label(key));
            assert!(matches!(fade.pending_timer(), Some((_, FadeTimer::Hold))));
        }
    }

    #[test]
    fn state_class_flags() {
        assert!(!DisplayState::Hidden.is_shown());
        assert!(DisplayState::Visible.is_shown());
        assert!(!DisplayState::Visible.is_fading());
        assert!(DisplayState::FadingOut.is_shown());
        assert!(DisplayState::FadingOut.is_fading());
    }
}

#![forbid(unsafe_code)]

//! The page session: one object per page load owning every piece of mutable
//! state (session id, input mode, fade lifecycle, dispatch sequence).
//!
//! Hosts forward DOM signals to the `on_*` methods and apply the returned
//! effects in order. Nothing here touches the DOM, timers or the network, so
//! the full keypress flow runs under native tests.

use tracing::{debug, info};

use crate::config::SpellConfig;
use crate::display::{DisplayEffect, DisplayState, FadeLifecycle, TimerToken};
use crate::hint::{HintHighlight, highlight};
use crate::input::{FocusTarget, InputMode, InputRouter};
use crate::key::KeyLabel;
use crate::notifier::{KeyDispatch, Notifier, NotifyError, Resolution};
use crate::protocol::KeypressResponse;
use crate::session::SessionId;

/// Effect produced by a dispatched key, applied by the host in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEffect {
    Display(DisplayEffect),
    Hint(HintHighlight),
}

/// Everything the host must do in response to one input signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReaction {
    pub prevent_default: bool,
    pub clear_text_surface: bool,
    pub effects: Vec<PageEffect>,
    /// Request to send, at most one per signal.
    pub request: Option<KeyDispatch>,
}

impl PageReaction {
    /// Whether this signal produced a logical keypress.
    #[must_use]
    pub fn dispatched(&self) -> bool {
        self.request.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct PageSession {
    config: SpellConfig,
    router: InputRouter,
    fade: FadeLifecycle,
    notifier: Notifier,
}

impl PageSession {
    /// Start a session with a freshly generated id.
    #[must_use]
    pub fn new(config: SpellConfig, mode: InputMode) -> Self {
        Self::with_session(config, mode, SessionId::generate())
    }

    /// Start a session with a known id.
    #[must_use]
    pub fn with_session(config: SpellConfig, mode: InputMode, session: SessionId) -> Self {
        let config = config.validated();
        info!(session_id = %session, ?mode, "page session started");
        Self {
            router: InputRouter::new(mode),
            fade: FadeLifecycle::from_config(&config),
            notifier: Notifier::new(&config, session),
            config,
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.notifier.session()
    }

    #[must_use]
    pub const fn input_mode(&self) -> InputMode {
        self.router.mode()
    }

    #[must_use]
    pub const fn config(&self) -> &SpellConfig {
        &self.config
    }

    #[must_use]
    pub const fn display_state(&self) -> DisplayState {
        self.fade.state()
    }

    #[must_use]
    pub fn display_text(&self) -> Option<&str> {
        self.fade.text()
    }

    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.fade.pending_timer().map(|(token, _)| token)
    }

    #[must_use]
    pub fn protected_url(&self) -> String {
        self.notifier.protected_url()
    }

    /// Document-level keydown.
    pub fn on_keydown(&mut self, key: &str, focus: FocusTarget) -> PageReaction {
        let route = self.router.keydown(key, focus);
        debug!(key, ?focus, ignored = ?route.ignored, "keydown");
        let mut reaction = PageReaction {
            prevent_default: route.prevent_default,
            ..PageReaction::default()
        };
        if let Some(label) = route.dispatch {
            self.dispatch_key(&label, &mut reaction);
        }
        reaction
    }

    /// Text surface `input` event carrying the surface's current value.
    pub fn on_text_input(&mut self, value: &str) -> PageReaction {
        let route = self.router.text_input(value);
        debug!(value, ignored = ?route.ignored(), "text surface input");
        let mut reaction = PageReaction {
            clear_text_surface: route.clear_surface,
            ..PageReaction::default()
        };
        if let Some(label) = route.dispatch {
            self.dispatch_key(&label, &mut reaction);
        }
        reaction
    }

    /// A fade timer fired.
    pub fn on_timer(&mut self, token: TimerToken) -> Vec<PageEffect> {
        self.fade
            .timer_elapsed(token)
            .into_iter()
            .map(PageEffect::Display)
            .collect()
    }

    /// The transport finished the request for dispatch `sequence`.
    pub fn on_response(
        &mut self,
        sequence: u64,
        outcome: Result<KeypressResponse, NotifyError>,
    ) -> Resolution {
        self.notifier.resolve(sequence, outcome)
    }

    fn dispatch_key(&mut self, label: &KeyLabel, reaction: &mut PageReaction) {
        reaction
            .effects
            .extend(self.fade.show(label).into_iter().map(PageEffect::Display));
        reaction
            .effects
            .push(PageEffect::Hint(highlight(&self.config.hint_text, label)));
        reaction.request = Some(self.notifier.dispatch(label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session(mode: InputMode) -> PageSession {
        PageSession::with_session(
            SpellConfig::default(),
            mode,
            SessionId::from_uuid(Uuid::from_u128(7)),
        )
    }

    #[test]
    fn keydown_updates_display_hint_and_request_together() {
        let mut page = session(InputMode::Pointer);
        let reaction = page.on_keydown("F", FocusTarget::Elsewhere);

        assert!(reaction.dispatched());
        assert_eq!(page.display_text(), Some("f"));
        assert_eq!(page.display_state(), DisplayState::Visible);
        assert!(reaction.effects.iter().any(|effect| matches!(
            effect,
            PageEffect::Hint(hint) if hint.matched == "f"
        )));
        let request = reaction.request.expect("request");
        assert_eq!(request.request.key, "F");
        assert_eq!(request.request.uuid, page.session_id());
    }

    #[test]
    fn ignored_keydown_has_no_effects() {
        let mut page = session(InputMode::Pointer);
        let reaction = page.on_keydown("Unidentified", FocusTarget::Elsewhere);
        assert_eq!(reaction, PageReaction::default());
        assert_eq!(page.display_state(), DisplayState::Hidden);
    }

    #[test]
    fn touch_enter_prevents_default_and_dispatches() {
        let mut page = session(InputMode::Touch);
        let reaction = page.on_keydown("Enter", FocusTarget::TextSurface);
        assert!(reaction.prevent_default);
        assert!(reaction.dispatched());
    }

    #[test]
    fn text_input_clears_surface() {
        let mut page = session(InputMode::Touch);
        let reaction = page.on_text_input("d");
        assert!(reaction.clear_text_surface);
        assert_eq!(reaction.request.map(|r| r.request.key), Some("d".to_owned()));
    }

    #[test]
    fn config_is_validated_on_start() {
        let config = SpellConfig {
            protected_path: String::new(),
            ..SpellConfig::default()
        };
        let page = PageSession::with_session(
            config,
            InputMode::Pointer,
            SessionId::from_uuid(Uuid::nil()),
        );
        assert_eq!(
            page.protected_url(),
            "/mines?session_id=00000000-0000-0000-0000-000000000000"
        );
    }
}

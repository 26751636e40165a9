#![forbid(unsafe_code)]

//! Input routing between the document keydown path and the touch text surface.
//!
//! On touch devices the virtual keyboard only appears while a text input has
//! focus, and composed characters are only reliable through that input's
//! `input` event. Character keys therefore arrive through
//! [`InputRouter::text_input`] while named keys (`Enter`, arrows, ...) still
//! arrive through [`InputRouter::keydown`]. The router drops the duplicate
//! half so that each logical keypress dispatches exactly once.

use crate::key::KeyLabel;

/// Media query the host evaluates once at startup.
pub const COARSE_POINTER_QUERY: &str = "(pointer: coarse)";

/// Input mode, fixed for the lifetime of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Physical keyboard; every keydown dispatches.
    #[default]
    Pointer,
    /// Coarse pointer; characters come from the text surface.
    Touch,
}

impl InputMode {
    /// Mode implied by the result of [`COARSE_POINTER_QUERY`].
    #[must_use]
    pub const fn from_coarse_pointer(matches: bool) -> Self {
        if matches { Self::Touch } else { Self::Pointer }
    }

    /// Whether the host should show the mobile form and listen on the text surface.
    #[must_use]
    pub const fn uses_text_surface(self) -> bool {
        matches!(self, Self::Touch)
    }
}

/// Where keyboard focus sat when a keydown fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    TextSurface,
    Elsewhere,
}

/// Why an input signal produced no dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIgnoredReason {
    /// Empty label or the `"Unidentified"` sentinel.
    Unrecognized,
    /// Character keydown on the focused text surface; its `input` event carries it.
    CharacterOnTextSurface,
    /// Text surface `input` event with an empty value.
    EmptySurface,
}

/// Routing decision for one keydown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeydownRoute {
    pub dispatch: Option<KeyLabel>,
    /// Suppress the browser default (Enter on the text surface would submit the form).
    pub prevent_default: bool,
    pub ignored: Option<InputIgnoredReason>,
}

impl KeydownRoute {
    fn dispatch(label: KeyLabel, prevent_default: bool) -> Self {
        Self {
            dispatch: Some(label),
            prevent_default,
            ignored: None,
        }
    }

    fn ignored(reason: InputIgnoredReason, prevent_default: bool) -> Self {
        Self {
            dispatch: None,
            prevent_default,
            ignored: Some(reason),
        }
    }
}

/// Routing decision for one text surface `input` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputRoute {
    pub dispatch: Option<KeyLabel>,
    /// Reset the surface value so the next character arrives alone.
    pub clear_surface: bool,
}

impl TextInputRoute {
    /// Reason the event produced nothing, if it did.
    #[must_use]
    pub fn ignored(&self) -> Option<InputIgnoredReason> {
        self.dispatch
            .is_none()
            .then_some(InputIgnoredReason::EmptySurface)
    }
}

/// Stateless router for one page's input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputRouter {
    mode: InputMode,
}

impl InputRouter {
    #[must_use]
    pub const fn new(mode: InputMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> InputMode {
        self.mode
    }

    /// Route a document-level keydown.
    #[must_use]
    pub fn keydown(&self, key: &str, focus: FocusTarget) -> KeydownRoute {
        let on_surface = self.mode.uses_text_surface() && focus == FocusTarget::TextSurface;
        let prevent_default = on_surface && key == "Enter";

        let Some(label) = KeyLabel::from_dom(key) else {
            return KeydownRoute::ignored(InputIgnoredReason::Unrecognized, prevent_default);
        };
        if on_surface && label.is_character() {
            return KeydownRoute::ignored(
                InputIgnoredReason::CharacterOnTextSurface,
                prevent_default,
            );
        }
        KeydownRoute::dispatch(label, prevent_default)
    }

    /// Route an `input` event from the text surface given its current value.
    ///
    /// Only the last character is dispatched; anything before it was already
    /// dispatched by an earlier event or is composition residue.
    #[must_use]
    pub fn text_input(&self, value: &str) -> TextInputRoute {
        let Some(last) = value.chars().next_back() else {
            return TextInputRoute {
                dispatch: None,
                clear_surface: false,
            };
        };
        let mut buf = [0u8; 4];
        TextInputRoute {
            dispatch: KeyLabel::from_dom(last.encode_utf8(&mut buf)),
            clear_surface: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn touch() -> InputRouter {
        InputRouter::new(InputMode::Touch)
    }

    fn pointer() -> InputRouter {
        InputRouter::new(InputMode::Pointer)
    }

    #[test]
    fn coarse_pointer_selects_touch_mode() {
        assert_eq!(InputMode::from_coarse_pointer(true), InputMode::Touch);
        assert_eq!(InputMode::from_coarse_pointer(false), InputMode::Pointer);
        assert!(InputMode::Touch.uses_text_surface());
        assert!(!InputMode::Pointer.uses_text_surface());
    }

    #[test]
    fn pointer_mode_dispatches_every_recognized_key() {
        let router = pointer();
        for key in ["a", "Enter", "ArrowUp", "?"] {
            let route = router.keydown(key, FocusTarget::Elsewhere);
            assert_eq!(route.dispatch.as_ref().map(KeyLabel::as_str), Some(key));
            assert!(!route.prevent_default);
        }
    }

    #[test]
    fn pointer_mode_ignores_focus_on_surface() {
        let route = pointer().keydown("a", FocusTarget::TextSurface);
        assert!(route.dispatch.is_some());
    }

    #[test]
    fn sentinel_keydown_is_ignored() {
        let route = pointer().keydown("Unidentified", FocusTarget::Elsewhere);
        assert_eq!(route.dispatch, None);
        assert_eq!(route.ignored, Some(InputIgnoredReason::Unrecognized));
    }

    #[test]
    fn touch_surface_drops_character_keydowns() {
        let route = touch().keydown("f", FocusTarget::TextSurface);
        assert_eq!(route.dispatch, None);
        assert_eq!(
            route.ignored,
            Some(InputIgnoredReason::CharacterOnTextSurface)
        );
    }

    #[test]
    fn touch_surface_keeps_named_keys_and_blocks_enter_submit() {
        let route = touch().keydown("Enter", FocusTarget::TextSurface);
        assert_eq!(route.dispatch.as_ref().map(KeyLabel::as_str), Some("Enter"));
        assert!(route.prevent_default);

        let route = touch().keydown("ArrowUp", FocusTarget::TextSurface);
        assert!(route.dispatch.is_some());
        assert!(!route.prevent_default);
    }

    #[test]
    fn touch_mode_without_surface_focus_behaves_like_pointer() {
        let route = touch().keydown("f", FocusTarget::Elsewhere);
        assert_eq!(route.dispatch.as_ref().map(KeyLabel::as_str), Some("f"));
        let route = touch().keydown("Enter", FocusTarget::Elsewhere);
        assert!(!route.prevent_default);
    }

    #[test]
    fn text_input_dispatches_last_character_and_clears() {
        let route = touch().text_input("frie");
        assert_eq!(route.dispatch.as_ref().map(KeyLabel::as_str), Some("e"));
        assert!(route.clear_surface);

        let route = touch().text_input("ñ");
        assert_eq!(route.dispatch.as_ref().map(KeyLabel::as_str), Some("ñ"));
    }

    #[test]
    fn empty_text_input_is_ignored() {
        let route = touch().text_input("");
        assert_eq!(route.dispatch, None);
        assert!(!route.clear_surface);
        assert_eq!(
            route.ignored(),
            Some(InputIgnoredReason::EmptySurface)
        );
    }

    proptest! {
        // Typing one character on the focused surface fires keydown then input;
        // exactly one of them may dispatch.
        #[test]
        fn surface_character_dispatches_once(ch in any::<char>()) {
            let router = touch();
            let key = ch.to_string();
            let down = router.keydown(&key, FocusTarget::TextSurface);
            let input = router.text_input(&key);
            let dispatched =
                usize::from(down.dispatch.is_some()) + usize::from(input.dispatch.is_some());
            prop_assert_eq!(dispatched, 1);
        }
    }
}

#![forbid(unsafe_code)]

//! Logical key labels taken from DOM `KeyboardEvent.key` / text-surface input.
//!
//! A [`KeyLabel`] is never empty and never the DOM `"Unidentified"` sentinel;
//! construction through [`KeyLabel::from_dom`] is the only filter the rest of
//! the crate relies on.

use core::fmt;

/// DOM value reported when the browser cannot determine the key.
pub const UNIDENTIFIED_KEY: &str = "Unidentified";

/// A dispatchable key label, exactly as the browser reported it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyLabel(Box<str>);

impl KeyLabel {
    /// Accept a raw DOM key value, rejecting empty labels and the sentinel.
    #[must_use]
    pub fn from_dom(key: &str) -> Option<Self> {
        if key.is_empty() || key == UNIDENTIFIED_KEY {
            return None;
        }
        Some(Self(key.into()))
    }

    /// Label as reported by the browser. This is what goes on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text shown in the key display.
    ///
    /// Always lowercase: the display font has no uppercase glyphs for some
    /// symbols.
    #[must_use]
    pub fn display_text(&self) -> String {
        self.0.to_lowercase()
    }

    /// True for labels made of a single Unicode scalar value (`"a"`, `"é"`, `"?"`).
    ///
    /// Named keys (`"Enter"`, `"ArrowUp"`, `"F5"`) are not characters.
    #[must_use]
    pub fn is_character(&self) -> bool {
        let mut chars = self.0.chars();
        chars.next().is_some() && chars.next().is_none()
    }

    /// True for the Enter key regardless of case.
    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.0.eq_ignore_ascii_case("enter")
    }
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

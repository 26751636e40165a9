#![forbid(unsafe_code)]

//! Hint field highlighting.
//!
//! The hint field shows a fixed phrase. Each dispatched key highlights the
//! first place it occurs in the phrase: `Enter` highlights the word `enter`,
//! single characters highlight their lowercase form, anything else leaves the
//! phrase plain.

use crate::key::KeyLabel;

/// The hint phrase split around the highlighted part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintHighlight {
    pub before: String,
    pub matched: String,
    pub after: String,
}

impl HintHighlight {
    fn plain(text: &str) -> Self {
        Self {
            before: text.to_owned(),
            matched: String::new(),
            after: String::new(),
        }
    }

    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.matched.is_empty()
    }

    /// Full phrase with no markup.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out =
            String::with_capacity(self.before.len() + self.matched.len() + self.after.len());
        out.push_str(&self.before);
        out.push_str(&self.matched);
        out.push_str(&self.after);
        out
    }
}

/// Compute the highlight for `label` within `hint`.
#[must_use]
pub fn highlight(hint: &str, label: &KeyLabel) -> HintHighlight {
    let needle = if label.is_enter() {
        "enter".to_owned()
    } else if label.is_character() {
        label.display_text()
    } else {
        return HintHighlight::plain(hint);
    };

    match hint.find(needle.as_str()) {
        Some(start) => {
            let end = start + needle.len();
            HintHighlight {
                before: hint[..start].to_owned(),
                matched: hint[start..end].to_owned(),
                after: hint[end..].to_owned(),
            }
        }
        None => HintHighlight::plain(hint),
    }
}

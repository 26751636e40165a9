#![forbid(unsafe_code)]

//! Translation of core effects into element-level DOM operations.
//!
//! Kept free of `web-sys` so the mapping is checked by native tests; the wasm
//! shell only knows how to apply a [`DomOp`] to a live element.

use spelldoor_core::{
    DisplayEffect, DisplayState, DomIds, HintHighlight, NotifierEffect, PageEffect,
};

/// Class toggled on the key display while it is shown.
pub const VISIBLE_CLASS: &str = "visible";
/// Class applied to the key display and door status while fading out.
pub const FADING_OUT_CLASS: &str = "is-fading-out";

/// One DOM mutation addressed by element id.
///
/// Ops against ids missing from the document are skipped by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomOp {
    SetText { id: String, text: String },
    AddClass { id: String, class: &'static str },
    RemoveClass { id: String, class: &'static str },
    /// Inline `display: block` / `display: none`.
    SetShown { id: String, shown: bool },
    /// Replace children with the hint phrase, highlighting the matched part.
    RenderHint {
        id: String,
        highlight: HintHighlight,
        color: String,
    },
}

/// Ops for a page effect. Timer effects have no DOM counterpart.
#[must_use]
pub fn page_effect_ops(ids: &DomIds, hint_color: &str, effect: &PageEffect) -> Vec<DomOp> {
    match effect {
        PageEffect::Display(DisplayEffect::SetText(text)) => vec![DomOp::SetText {
            id: ids.pressed_key.clone(),
            text: text.clone(),
        }],
        PageEffect::Display(DisplayEffect::Apply(state)) => display_state_ops(ids, *state),
        PageEffect::Display(DisplayEffect::CancelTimer(_) | DisplayEffect::ScheduleTimer(_)) => {
            Vec::new()
        }
        PageEffect::Hint(highlight) => vec![DomOp::RenderHint {
            id: ids.hint_field.clone(),
            highlight: highlight.clone(),
            color: hint_color.to_owned(),
        }],
    }
}

/// Class changes that put the key display into `state`.
#[must_use]
pub fn display_state_ops(ids: &DomIds, state: DisplayState) -> Vec<DomOp> {
    let id = &ids.key_display;
    let visible = if state.is_shown() {
        DomOp::AddClass {
            id: id.clone(),
            class: VISIBLE_CLASS,
        }
    } else {
        DomOp::RemoveClass {
            id: id.clone(),
            class: VISIBLE_CLASS,
        }
    };
    let fading = if state.is_fading() {
        DomOp::AddClass {
            id: id.clone(),
            class: FADING_OUT_CLASS,
        }
    } else {
        DomOp::RemoveClass {
            id: id.clone(),
            class: FADING_OUT_CLASS,
        }
    };
    // Clear the fade before showing so the element never flashes the fade class.
    if state == DisplayState::Visible {
        vec![fading, visible]
    } else {
        vec![visible, fading]
    }
}

/// Ops for a notifier effect. The reveal itself is deferred; see [`reveal_ops`].
#[must_use]
pub fn notifier_effect_ops(ids: &DomIds, effect: &NotifierEffect) -> Vec<DomOp> {
    match effect {
        NotifierEffect::FadeDoorStatus => vec![DomOp::AddClass {
            id: ids.door_status.clone(),
            class: FADING_OUT_CLASS,
        }],
        NotifierEffect::HideError => vec![DomOp::SetShown {
            id: ids.error_message.clone(),
            shown: false,
        }],
        NotifierEffect::ShowError(message) => vec![
            DomOp::SetText {
                id: ids.error_message.clone(),
                text: message.clone(),
            },
            DomOp::SetShown {
                id: ids.error_message.clone(),
                shown: true,
            },
        ],
        NotifierEffect::ScheduleReveal { .. } => Vec::new(),
    }
}

/// Ops run when the reveal delay elapses.
#[must_use]
pub fn reveal_ops(ids: &DomIds) -> Vec<DomOp> {
    vec![DomOp::SetShown {
        id: ids.protected_link.clone(),
        shown: true,
    }]
}

/// Ops run once at mount on touch devices.
#[must_use]
pub fn touch_setup_ops(ids: &DomIds) -> Vec<DomOp> {
    vec![DomOp::SetShown {
        id: ids.mobile_form.clone(),
        shown: true,
    }]
}

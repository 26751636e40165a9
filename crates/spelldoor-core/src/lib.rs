#![forbid(unsafe_code)]

//! `spelldoor-core` is the host-driven core of the spell door page.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS/wasm shell) pushes
//!   keydown, text input, timer and HTTP reply signals in.
//! - **Effects out**: every signal returns plain values describing DOM updates,
//!   timers to (re)schedule and requests to send.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`, and
//!   fully testable on native targets.
//!
//! [`page::PageSession`] ties the pieces together and is the type hosts
//! normally hold.

pub mod config;
pub mod display;
pub mod hint;
pub mod input;
pub mod key;
pub mod notifier;
pub mod page;
pub mod protocol;
pub mod session;

pub use config::{ConfigError, DomIds, LogLevel, ResponseOrdering, SpellConfig};
pub use display::{
    DisplayEffect, DisplayState, FadeLifecycle, FadeTimer, TimerRequest, TimerToken,
};
pub use hint::HintHighlight;
pub use input::{COARSE_POINTER_QUERY, FocusTarget, InputMode, InputRouter};
pub use key::{KeyLabel, UNIDENTIFIED_KEY};
pub use notifier::{
    HttpReply, KeyDispatch, Notifier, NotifierEffect, NotifyError, Resolution, SpellVerdict,
};
pub use page::{PageEffect, PageReaction, PageSession};
pub use protocol::{KeypressRequest, KeypressResponse};
pub use session::SessionId;

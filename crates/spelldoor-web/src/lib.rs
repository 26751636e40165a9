#![forbid(unsafe_code)]

//! WASM frontend for the spell door page.
//!
//! This crate provides `SpellDoor`, a `wasm-bindgen`-exported struct that
//! mounts a [`spelldoor_core::PageSession`] onto the served document:
//!
//! ```js
//! import init, { SpellDoor } from "./pkg/spelldoor_web.js";
//!
//! document.addEventListener("DOMContentLoaded", async () => {
//!     await init();
//!     window.spellDoor = new SpellDoor(null);
//! });
//! ```
//!
//! The effect-to-DOM mapping ([`dom_ops`]), timer handle bookkeeping
//! ([`timer_book`]) and the console log layer ([`console_layer`]) are
//! target-independent and tested natively.

pub mod console_layer;
pub mod dom_ops;
pub mod error;
pub mod timer_book;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{SpellDoor, mount_default};

pub use error::MountError;

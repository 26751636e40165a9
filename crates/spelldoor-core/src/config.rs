#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every field has a default matching the deployed page, so hosts normally
//! mount with no configuration at all. A host that needs to override
//! something passes a JSON object containing only the fields it changes.

use core::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default hold before the key display starts fading.
pub const DEFAULT_HOLD_DELAY_MS: u64 = 500;
/// Default fade-out duration before the key display is hidden.
pub const DEFAULT_FADE_OUT_DELAY_MS: u64 = 3000;
/// Default wait between fading the door status and revealing the protected button.
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 500;
/// Upper clamp for every configured delay.
pub const MAX_DELAY_MS: u64 = 60_000;

pub const DEFAULT_KEYPRESS_ENDPOINT: &str = "/keypress";
pub const DEFAULT_PROTECTED_PATH: &str = "/mines";
pub const DEFAULT_HINT_TEXT: &str = "friend - enter";
pub const DEFAULT_HINT_COLOR: &str = "yellow";
pub const DEFAULT_ALREADY_CAST_PATTERN: &str = "already cast the spell";
pub const DEFAULT_TRANSPORT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse page config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How concurrent keypress responses update shared UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Every response is applied as it resolves; the last one to resolve wins.
    #[default]
    LastResolved,
    /// Only the response to the most recently dispatched key is applied.
    LatestOnly,
}

/// Most verbose level forwarded to the browser console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

/// Element ids the page expects in the served document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomIds {
    pub pressed_key: String,
    pub key_display: String,
    pub door_status: String,
    pub error_message: String,
    pub protected_link: String,
    pub hint_field: String,
    pub mobile_input: String,
    pub mobile_form: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            pressed_key: "pressed-key".to_owned(),
            key_display: "key-display".to_owned(),
            door_status: "door-status".to_owned(),
            error_message: "error-message".to_owned(),
            protected_link: "protected-link".to_owned(),
            hint_field: "hint-field".to_owned(),
            mobile_input: "mobile-input".to_owned(),
            mobile_form: "mobile-form".to_owned(),
        }
    }
}

/// Page configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellConfig {
    /// How long the pressed key stays fully visible.
    /// Default: 500ms.
    pub hold_delay_ms: u64,

    /// How long the fade-out class stays applied before the display hides.
    /// Default: 3000ms.
    pub fade_out_delay_ms: u64,

    /// Delay between fading the door status and showing the protected button.
    /// Default: 500ms.
    pub reveal_delay_ms: u64,

    pub keypress_endpoint: String,

    /// Path the protected button navigates to; `?session_id=` is appended.
    pub protected_path: String,

    pub hint_text: String,
    pub hint_color: String,

    /// Substring of a rejection message that means this client already succeeded.
    pub already_cast_pattern: String,

    /// Message shown in the error region on transport failure when
    /// `surface_transport_errors` is set.
    pub transport_error_message: String,

    /// Show transport failures to the user instead of only logging them.
    /// Default: false.
    pub surface_transport_errors: bool,

    pub response_ordering: ResponseOrdering,

    /// Default: info.
    pub log_level: LogLevel,

    pub dom: DomIds,
}

impl Default for SpellConfig {
    fn default() -> Self {
        Self {
            hold_delay_ms: DEFAULT_HOLD_DELAY_MS,
            fade_out_delay_ms: DEFAULT_FADE_OUT_DELAY_MS,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            keypress_endpoint: DEFAULT_KEYPRESS_ENDPOINT.to_owned(),
            protected_path: DEFAULT_PROTECTED_PATH.to_owned(),
            hint_text: DEFAULT_HINT_TEXT.to_owned(),
            hint_color: DEFAULT_HINT_COLOR.to_owned(),
            already_cast_pattern: DEFAULT_ALREADY_CAST_PATTERN.to_owned(),
            transport_error_message: DEFAULT_TRANSPORT_ERROR_MESSAGE.to_owned(),
            surface_transport_errors: false,
            response_ordering: ResponseOrdering::default(),
            log_level: LogLevel::default(),
            dom: DomIds::default(),
        }
    }
}

impl SpellConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    #[must_use]
    pub fn with_hold_delay(mut self, delay: Duration) -> Self {
        self.hold_delay_ms = duration_ms(delay);
        self
    }

    #[must_use]
    pub fn with_fade_out_delay(mut self, delay: Duration) -> Self {
        self.fade_out_delay_ms = duration_ms(delay);
        self
    }

    #[must_use]
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay_ms = duration_ms(delay);
        self
    }

    #[must_use]
    pub fn with_protected_path(mut self, path: impl Into<String>) -> Self {
        self.protected_path = path.into();
        self
    }

    #[must_use]
    pub fn with_response_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.response_ordering = ordering;
        self
    }

    /// Surface transport failures in the error region.
    #[must_use]
    pub fn surface_transport_errors(mut self) -> Self {
        self.surface_transport_errors = true;
        self
    }

    /// Clamp delays to `0..=MAX_DELAY_MS` and restore defaults for blank strings.
    ///
    /// # Example
    ///
    /// ```
    /// use spelldoor_core::config::SpellConfig;
    /// use std::time::Duration;
    ///
    /// let config = SpellConfig::default()
    ///     .with_hold_delay(Duration::from_secs(600))
    ///     .with_protected_path("")
    ///     .validated();
    ///
    /// assert_eq!(config.hold_delay().as_millis(), 60_000);
    /// assert_eq!(config.protected_path, "/mines");
    /// ```
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.hold_delay_ms = self.hold_delay_ms.min(MAX_DELAY_MS);
        self.fade_out_delay_ms = self.fade_out_delay_ms.min(MAX_DELAY_MS);
        self.reveal_delay_ms = self.reveal_delay_ms.min(MAX_DELAY_MS);

        if self.keypress_endpoint.trim().is_empty() {
            self.keypress_endpoint = DEFAULT_KEYPRESS_ENDPOINT.to_owned();
        }
        if self.protected_path.trim().is_empty() {
            self.protected_path = DEFAULT_PROTECTED_PATH.to_owned();
        }
        // An empty pattern would match every server message.
        if self.already_cast_pattern.trim().is_empty() {
            self.already_cast_pattern = DEFAULT_ALREADY_CAST_PATTERN.to_owned();
        }
        self
    }

    #[must_use]
    pub const fn hold_delay(&self) -> Duration {
        Duration::from_millis(self.hold_delay_ms)
    }

    #[must_use]
    pub const fn fade_out_delay(&self) -> Duration {
        Duration::from_millis(self.fade_out_delay_ms)
    }

    #[must_use]
    pub const fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

fn duration_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

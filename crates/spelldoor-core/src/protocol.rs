#![forbid(unsafe_code)]

//! Wire types for the `/keypress` endpoint.
//!
//! Request: `{"key": string, "uuid": string}`.
//! Response: `{"spell_successful": bool, "message"?: string}`; a missing
//! `spell_successful` reads as `false` and unknown fields are ignored.

use serde::{Deserialize, Serialize};

use crate::key::KeyLabel;
use crate::session::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeypressRequest {
    /// Key label as typed; case is preserved on the wire.
    pub key: String,
    pub uuid: SessionId,
}

impl KeypressRequest {
    #[must_use]
    pub fn new(label: &KeyLabel, session: SessionId) -> Self {
        Self {
            key: label.as_str().to_owned(),
            uuid: session,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeypressResponse {
    #[serde(default)]
    pub spell_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl KeypressResponse {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

/// Navigation target for the protected-resource button.
///
/// Session ids are hyphenated hex, so no percent-encoding is needed.
#[must_use]
pub fn protected_url(path: &str, session: SessionId) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}session_id={session}")
}

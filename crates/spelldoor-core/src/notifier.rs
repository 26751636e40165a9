#![forbid(unsafe_code)]

//! Keypress notifier: builds outbound requests and turns server replies into
//! page effects.
//!
//! The notifier never performs I/O. The host sends the [`KeyDispatch`] body
//! with whatever transport it has, then feeds the reply back through
//! [`Notifier::resolve`] together with the dispatch sequence number.

use core::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{ResponseOrdering, SpellConfig};
use crate::key::KeyLabel;
use crate::protocol::{KeypressRequest, KeypressResponse, protected_url};
use crate::session::SessionId;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned {status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("failed to decode server response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode keypress: {0}")]
    Encode(serde_json::Error),
}

/// Raw HTTP reply as seen by the host transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check the status, then decode the body.
    pub fn into_response(self) -> Result<KeypressResponse, NotifyError> {
        if !self.is_success() {
            return Err(NotifyError::Status {
                status: self.status,
                status_text: self.status_text,
            });
        }
        Ok(KeypressResponse::from_json(&self.body)?)
    }
}

/// One outbound keypress, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDispatch {
    pub sequence: u64,
    pub endpoint: String,
    pub request: KeypressRequest,
}

impl KeyDispatch {
    /// JSON request body.
    pub fn body(&self) -> Result<String, NotifyError> {
        self.request.to_json().map_err(NotifyError::Encode)
    }
}

/// How a resolved keypress was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellVerdict {
    /// The spell was completed; the protected resource is unlocked.
    Granted,
    /// The server refused because this client already succeeded.
    AlreadyCast(String),
    /// Ordinary non-completing keypress.
    Pending,
    /// Transport, status or decoding failure.
    Failed,
    /// A newer dispatch exists and ordering is [`ResponseOrdering::LatestOnly`].
    Superseded { latest: u64 },
}

/// Page effect requested by a resolved keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierEffect {
    /// Add the fade-out class to the door status indicator.
    FadeDoorStatus,
    HideError,
    ShowError(String),
    /// After `delay`, show the protected button navigating to `url`.
    ScheduleReveal { delay: Duration, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub verdict: SpellVerdict,
    pub effects: Vec<NotifierEffect>,
}

impl Resolution {
    fn quiet(verdict: SpellVerdict) -> Self {
        Self {
            verdict,
            effects: Vec::new(),
        }
    }
}

/// Request builder and response interpreter for one page session.
#[derive(Debug, Clone)]
pub struct Notifier {
    session: SessionId,
    endpoint: String,
    protected_path: String,
    reveal_delay: Duration,
    already_cast_pattern: String,
    transport_error_message: Option<String>,
    ordering: ResponseOrdering,
    next_sequence: u64,
    latest_dispatched: Option<u64>,
}

impl Notifier {
    #[must_use]
    pub fn new(config: &SpellConfig, session: SessionId) -> Self {
        Self {
            session,
            endpoint: config.keypress_endpoint.clone(),
            protected_path: config.protected_path.clone(),
            reveal_delay: config.reveal_delay(),
            already_cast_pattern: config.already_cast_pattern.clone(),
            transport_error_message: config
                .surface_transport_errors
                .then(|| config.transport_error_message.clone()),
            ordering: config.response_ordering,
            next_sequence: 1,
            latest_dispatched: None,
        }
    }

    #[must_use]
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Sequence number of the most recent dispatch.
    #[must_use]
    pub const fn latest_dispatched(&self) -> Option<u64> {
        self.latest_dispatched
    }

    /// Protected-resource URL for this session.
    #[must_use]
    pub fn protected_url(&self) -> String {
        protected_url(&self.protected_path, self.session)
    }

    /// Build the request for one dispatched key.
    pub fn dispatch(&mut self, label: &KeyLabel) -> KeyDispatch {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.latest_dispatched = Some(sequence);
        KeyDispatch {
            sequence,
            endpoint: self.endpoint.clone(),
            request: KeypressRequest::new(label, self.session),
        }
    }

    /// Interpret the outcome of dispatch `sequence`.
    pub fn resolve(
        &mut self,
        sequence: u64,
        outcome: Result<KeypressResponse, NotifyError>,
    ) -> Resolution {
        if self.ordering == ResponseOrdering::LatestOnly
            && let Some(latest) = self.latest_dispatched
            && sequence != latest
        {
            warn!(sequence, latest, "discarding superseded keypress response");
            return Resolution::quiet(SpellVerdict::Superseded { latest });
        }

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                error!(sequence, error = %err, "failed to send keypress event to server");
                let effects = self
                    .transport_error_message
                    .clone()
                    .map(NotifierEffect::ShowError)
                    .into_iter()
                    .collect();
                return Resolution {
                    verdict: SpellVerdict::Failed,
                    effects,
                };
            }
        };

        info!(
            sequence,
            spell_successful = response.spell_successful,
            server_message = response.message.as_deref().unwrap_or(""),
            "server response"
        );

        if response.spell_successful {
            return Resolution {
                verdict: SpellVerdict::Granted,
                effects: vec![
                    NotifierEffect::FadeDoorStatus,
                    NotifierEffect::ScheduleReveal {
                        delay: self.reveal_delay,
                        url: self.protected_url(),
                    },
                    NotifierEffect::HideError,
                ],
            };
        }

        match response.message {
            Some(message) if message.contains(self.already_cast_pattern.as_str()) => Resolution {
                verdict: SpellVerdict::AlreadyCast(message.clone()),
                effects: vec![NotifierEffect::ShowError(message)],
            },
            _ => Resolution::quiet(SpellVerdict::Pending),
        }
    }
}

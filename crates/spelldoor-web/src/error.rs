#![forbid(unsafe_code)]

use spelldoor_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("required element not found: #{id}")]
    MissingElement { id: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to attach {event} listener: {message}")]
    Listener { event: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_missing_piece() {
        let err = MountError::MissingElement {
            id: "pressed-key".into(),
        };
        assert_eq!(err.to_string(), "required element not found: #pressed-key");
    }

    #[test]
    fn config_errors_pass_through() {
        let err: MountError = spelldoor_core::SpellConfig::from_json("[")
            .expect_err("not an object")
            .into();
        assert!(err.to_string().starts_with("failed to parse page config JSON"));
    }
}

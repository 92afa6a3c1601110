//! Error types shared across the relay.

use std::time::Duration;

/// Startup configuration failures. Always fatal.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required configuration value {0} is missing")]
    Missing(&'static str),

    #[error("configuration value {key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Reasons a button payload cannot be turned into a decision.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("payload repeats the '{0}' field")]
    DuplicateField(String),

    #[error("payload carries unknown field '{0}'")]
    UnknownField(String),

    #[error("unknown action '{0}'")]
    BadAction(String),

    #[error("payer '{0}' is not a valid user id")]
    BadPayer(String),

    #[error("segment '{0}' is not a key:value pair")]
    Malformed(String),
}

/// Failure of a single outbound call to the messaging platform.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("platform request failed: {0}")]
    Request(String),

    #[error("platform request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<teloxide::RequestError> for PlatformError {
    fn from(err: teloxide::RequestError) -> Self {
        PlatformError::Request(err.to_string())
    }
}

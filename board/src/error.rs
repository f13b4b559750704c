//! Error types for the feed board
//!
//! - `BackendError`: failures talking to the feed backend (or saving a download)
//! - `ConfigError`: malformed environment configuration

use thiserror::Error;

/// Message shown when the backend gives no usable error body
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Feed backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status; `message` comes from the `{ "error": ... }` body
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        BackendError::Api {
            status,
            message: message.into(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

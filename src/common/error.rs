//! Error types for goals-check
//!
//! Error messages name the failing operation and, where possible, the
//! configuration key or response field involved, so a failed run can be
//! diagnosed from stdout alone.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for goals-check
#[derive(Error, Debug)]
pub enum Error {
    // === HTTP Errors ===
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation} response is missing '{field}'")]
    MissingField { operation: String, field: String },

    // === Configuration Errors ===
    #[error("Missing setting '{0}'. Set it in the config file or via its environment variable")]
    MissingSetting(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Browser Errors ===
    #[error("Browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("Browser error: {0}")]
    Browser(String),

    // === Timeout Errors ===
    #[error("Timed out after {millis} ms waiting for {what}")]
    Timeout { what: String, millis: u64 },

    // === Test Errors ===
    #[error("Assertion failed: {0}")]
    TestAssertion(String),
}

impl Error {
    /// Create an unexpected status error from a status code and response body
    pub fn unexpected_status(operation: &str, status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            operation: operation.to_string(),
            status,
            body: body.into(),
        }
    }

    /// Create a missing response field error
    pub fn missing_field(operation: &str, field: &str) -> Self {
        Self::MissingField {
            operation: operation.to_string(),
            field: field.to_string(),
        }
    }

    /// Create a timeout error
    pub fn timeout(what: impl Into<String>, millis: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            millis,
        }
    }

    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

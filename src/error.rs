use miette::{Diagnostic, Result};
use rust_i18n::t;
use std::fmt;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("No Outlook API token found in client storage")]
    #[diagnostic(
        code(ooto::credential_not_found),
        help("Refresh the Outlook page so the web client issues a fresh token, then retry.")
    )]
    CredentialNotFound,

    #[error("Could not determine the signed-in user's email address")]
    #[diagnostic(
        code(ooto::email_not_found),
        help("Make sure the saved page was captured while logged in.")
    )]
    EmailNotFound,

    #[error("Invalid time range: {0}")]
    #[diagnostic(code(ooto::time_range))]
    InvalidTimeRange(String),

    #[error("Calendar write failed: {0}")]
    #[diagnostic(
        code(ooto::write_failure),
        help("Writes are not rolled back. Check the calendar before resubmitting; a resubmission creates new meetings.")
    )]
    PartialOrTotalWriteFailure(WriteFailure),

    #[error("Environment error: {0}")]
    #[diagnostic(code(ooto::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ooto::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(ooto::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(ooto::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(ooto::other))]
    Other(String),
}

/// Failure of a single calendar write
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The backend answered with a status other than 200/201
    #[error("HTTP {status} - {body}")]
    Rejected { status: u16, body: String },
    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Outcome of the notification/self-block pair when at least one write failed.
///
/// A `None` side succeeded on the server. Nothing is rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub notification: Option<WriteError>,
    pub self_block: Option<WriteError>,
}

impl WriteFailure {
    /// True when exactly one of the two writes went through
    pub fn is_partial(&self) -> bool {
        self.notification.is_some() != self.self_block.is_some()
    }
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.notification, &self.self_block) {
            (Some(n), Some(s)) => write!(
                f,
                "notification meeting failed ({}); self block failed ({})",
                n, s
            ),
            (Some(n), None) => write!(
                f,
                "notification meeting failed ({}); self block was created",
                n
            ),
            (None, Some(s)) => write!(
                f,
                "self block failed ({}); notification meeting was created",
                s
            ),
            (None, None) => write!(f, "no write failed"),
        }
    }
}

impl Error {
    /// Human-readable message for the person who asked for the OOTO
    pub fn user_message(&self) -> String {
        match self {
            Error::CredentialNotFound => t!("credential_not_found").to_string(),
            Error::EmailNotFound => t!("email_not_found").to_string(),
            Error::InvalidTimeRange(reason) => {
                t!("invalid_time_range", reason = reason).to_string()
            }
            Error::PartialOrTotalWriteFailure(failure) if failure.is_partial() => {
                t!("partial_write_failure", detail = failure.to_string()).to_string()
            }
            Error::PartialOrTotalWriteFailure(failure) => {
                t!("write_failure", detail = failure.to_string()).to_string()
            }
            other => t!("generic_error", message = other.to_string()).to_string(),
        }
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type OotoResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create time range errors
pub fn time_range_error(message: &str) -> Error {
    Error::InvalidTimeRange(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}

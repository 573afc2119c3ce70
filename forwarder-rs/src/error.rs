//! Error types for forwarder-rs

use thiserror::Error;

/// Result type alias for forwarder operations
pub type Result<T> = std::result::Result<T, ForwarderError>;

/// Forwarder error types
#[derive(Error, Debug)]
pub enum ForwarderError {
    /// A required field was missing; raised before any outbound call
    #[error("{0}")]
    Validation(String),

    /// DirectAdmin answered but did not report `error=0`
    #[error("DirectAdmin API error: {0}")]
    Rejected(String),

    /// DirectAdmin answered with a non-2xx status
    #[error("DirectAdmin returned HTTP {0}")]
    UpstreamStatus(u16),

    /// Network fault, timeout or TLS failure talking to DirectAdmin
    #[error("Request to DirectAdmin failed: {0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session token could not be issued or verified
    #[error("Session error: {0}")]
    Session(String),
}

impl From<reqwest::Error> for ForwarderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ForwarderError::Transport(format!("timed out: {}", err))
        } else {
            ForwarderError::Transport(err.to_string())
        }
    }
}

impl From<::config::ConfigError> for ForwarderError {
    fn from(err: ::config::ConfigError) -> Self {
        ForwarderError::Config(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ForwarderError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ForwarderError::Session(err.to_string())
    }
}

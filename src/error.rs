//! Error types for ragchat
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for ragchat operations
///
/// Covers configuration loading, Chat API interactions, session store
/// operations and the interactive terminal.
#[derive(Error, Debug)]
pub enum RagChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The Chat API answered with a non-success status
    #[error("Chat API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the backend
        status: u16,
        /// Body or reason text returned by the backend
        message: String,
    },

    /// The backend refused a send with "too many requests"
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// A list position did not name a session
    #[error("No session at position {0}")]
    SessionIndexOutOfRange(usize),

    /// No session with the given id is known
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A question was empty after trimming
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// The session is still waiting for the reply to an earlier question
    #[error("A reply is already pending for session {0}")]
    ReplyPending(String),

    /// Interactive terminal errors
    #[error("Readline error: {0}")]
    Readline(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// URL construction errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RagChatError {
    /// Returns true when the error is the backend's rate-limit signal
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// Result type alias for ragchat operations
///
/// Uses `anyhow::Error` so callers can attach context; typed failures are
/// recovered with `downcast_ref::<RagChatError>()`.
pub type Result<T> = anyhow::Result<T>;

//! Error types for the console

use thiserror::Error;

/// Main error type for the console
///
/// `Transport`, `Http` and `Application` display as the bare message so callers
/// can embed them in user-facing notices.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Application(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Whether the fetcher should try the request again
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConsoleError::Transport(_) | ConsoleError::Http { .. })
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        ConsoleError::Transport(err.to_string())
    }
}

impl From<anyhow::Error> for ConsoleError {
    fn from(err: anyhow::Error) -> Self {
        ConsoleError::Internal(err.to_string())
    }
}

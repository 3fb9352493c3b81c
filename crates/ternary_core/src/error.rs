use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the Ternary backend.
#[derive(Error, Debug)]
pub enum TernaryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad classification used for log routing and user display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Invalid or missing configuration.
    ConfigError,
    /// Storage or file I/O failure.
    SystemError,
    /// Embedding backend failure (recoverable; selection degrades).
    ProviderError,
}

impl TernaryError {
    /// Returns the broad error category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::ConfigError,
            Self::FileSystem(_) | Self::Cache(_) | Self::Internal(_) => {
                ErrorCategory::SystemError
            }
            Self::Embedding(_) => ErrorCategory::ProviderError,
        }
    }

    /// Returns a user-friendly message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Configuration issue: {msg}"),
            Self::FileSystem(msg) => format!("File error: {msg}"),
            Self::Embedding(_) => {
                "Embedding service unavailable. Falling back to keyword scoring.".into()
            }
            Self::Cache(_) => "Cache error. Check disk space and permissions.".into(),
            Self::Internal(_) => "An unexpected error occurred.".into(),
        }
    }
}

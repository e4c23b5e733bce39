//! Error types for twitchtui.

use thiserror::Error;

use crate::auth::AuthError;
use crate::chat::ChatError;

/// Primary error type for application-level operations.
#[derive(Error, Debug)]
pub enum TwitchTuiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthError),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Broad error category for choosing what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Server,
    Api,
    Configuration,
    Serialization,
    Chat,
    Unknown,
}

impl TwitchTuiError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(AuthError::Network(_)) => ErrorCategory::Network,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Network(_) => ErrorCategory::Network,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Chat(_) => ErrorCategory::Chat,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Io(_) | Self::Terminal(_) => ErrorCategory::Unknown,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TwitchTuiError>;

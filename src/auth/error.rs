use std::time::Duration;

use thiserror::Error;

/// Failures of the session-establishment flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identity provider returned status {status}: {message}")]
    Transport { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Token is invalid or expired")]
    InvalidToken,
    #[error("Callback listener error: {0}")]
    Listener(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Failed to open browser: {0}")]
    BrowserLaunch(String),
    #[error("Authorization denied: {0}")]
    AccessDenied(String),
    #[error("No authorization callback received within {}s", .0.as_secs())]
    CallbackTimeout(Duration),
    #[error("Authorization cancelled")]
    Cancelled,
    #[error("IO error: {0}")]
    Io(String),
}

impl AuthError {
    pub(crate) fn transport(status: reqwest::StatusCode, action: &str) -> Self {
        Self::Transport {
            status: status.as_u16(),
            message: format!("{action} failed"),
        }
    }

    /// Status code observed from the provider, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::InvalidToken => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Self::Decode(error.to_string());
        }
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<url::ParseError> for AuthError {
    fn from(error: url::ParseError) -> Self {
        Self::Decode(format!("invalid URL: {error}"))
    }
}

use thiserror::Error;

/// Failures of the chat connection.
///
/// `Clone` so the same failure can be published as the connection outcome
/// and logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("failed to connect to chat: {0}")]
    Connect(String),

    #[error("chat rejected credentials: {0}")]
    Authentication(String),

    #[error("chat protocol error: {0}")]
    Protocol(String),

    #[error("chat connection closed")]
    Closed,

    #[error("chat connection cancelled")]
    Cancelled,
}

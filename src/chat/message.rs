use std::fmt;

use crate::auth::Session;

use super::error::ChatError;

/// Username carried by the synthetic join acknowledgement.
pub const JOINED_MARKER: &str = "JOINED";

/// One chat line, or the join acknowledgement marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub username: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            text: text.into(),
        }
    }

    /// Marker for the transport confirming the channel join. `raw` is the
    /// line that confirmed it.
    pub fn joined(raw: impl Into<String>) -> Self {
        Self::new(JOINED_MARKER, raw)
    }

    pub fn is_join_marker(&self) -> bool {
        self.username == JOINED_MARKER
    }
}

/// Result of one `connect` attempt. Published exactly once per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Connected,
    Failed(ChatError),
}

/// Login and `oauth:`-prefixed token used to authenticate to chat.
#[derive(Clone)]
pub struct ChatCredentials {
    pub login: String,
    pub oauth_token: String,
}

impl ChatCredentials {
    pub fn new(login: impl Into<String>, token: &str) -> Self {
        Self {
            login: login.into(),
            oauth_token: format!("oauth:{token}"),
        }
    }

    pub fn from_session(session: &Session) -> Self {
        Self::new(session.login(), session.token())
    }
}

impl fmt::Debug for ChatCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCredentials")
            .field("login", &self.login)
            .field("oauth_token", &"[redacted]")
            .finish()
    }
}

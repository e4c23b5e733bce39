//! Convenience re-exports.

pub use crate::api::{HelixClient, Stream};
pub use crate::auth::{
    AuthError, AuthorizationManager, FileTokenStore, PersistedSession, Session, TokenStore,
};
pub use crate::chat::{ChatBridge, ChatHandle, ChatMessage, ChatOutcome, TwitchIrcTransport};
pub use crate::config::TwitchTuiConfig;
pub use crate::error::{Result, TwitchTuiError};
pub use crate::util::{BrowserLauncher, SystemBrowser};

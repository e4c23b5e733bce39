//! Live chat: transport, background bridge and message types.

pub mod bridge;
pub mod error;
pub mod irc;
pub mod message;
pub mod transport;

pub use bridge::{ChatBridge, ChatHandle};
pub use error::ChatError;
pub use message::{ChatCredentials, ChatMessage, ChatOutcome, JOINED_MARKER};
pub use transport::{ChatLink, ChatTransport, TwitchIrcTransport};

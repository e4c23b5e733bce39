//! Turns one chat connection into tagged UI messages.

use tokio::sync::oneshot;

use super::state::Msg;
use crate::chat::{ChatError, ChatHandle, ChatOutcome};

/// Events of one chat connection, in the order the model must see them:
/// the outcome, then messages, then a single `ChatClosed`.
pub struct ChatFeed {
    handle: ChatHandle,
    generation: u64,
    outcome: Option<oneshot::Receiver<ChatOutcome>>,
    closed: bool,
}

impl ChatFeed {
    pub fn new(mut handle: ChatHandle, generation: u64) -> Self {
        let outcome = handle.take_outcome();
        Self {
            handle,
            generation,
            outcome,
            closed: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Next event, or `None` once the connection has been reported closed.
    ///
    /// Cancel safe: a dropped call loses nothing.
    pub async fn next_event(&mut self) -> Option<Msg> {
        if self.closed {
            return None;
        }
        if let Some(outcome_rx) = self.outcome.as_mut() {
            let outcome = outcome_rx
                .await
                .unwrap_or(ChatOutcome::Failed(ChatError::Closed));
            self.outcome = None;
            return Some(Msg::ChatOutcome {
                generation: self.generation,
                outcome,
            });
        }
        match self.handle.next_message().await {
            Some(message) => Some(Msg::ChatMessage {
                generation: self.generation,
                message,
            }),
            None => {
                self.closed = true;
                Some(Msg::ChatClosed {
                    generation: self.generation,
                })
            }
        }
    }

    pub async fn disconnect(mut self) {
        self.handle.disconnect().await;
    }
}

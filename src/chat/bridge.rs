//! Runs one chat connection in the background and hands its events to the
//! UI loop over channels.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::ChatError;
use super::message::{ChatCredentials, ChatMessage, ChatOutcome};
use super::transport::{ChatLink, ChatTransport};
use crate::auth::Session;

/// Spawns chat connections authenticated as the current session.
#[derive(Clone)]
pub struct ChatBridge {
    transport: Arc<dyn ChatTransport>,
    credentials: ChatCredentials,
}

impl ChatBridge {
    pub fn new(transport: Arc<dyn ChatTransport>, session: &Session) -> Self {
        Self::with_credentials(transport, ChatCredentials::from_session(session))
    }

    pub fn with_credentials(transport: Arc<dyn ChatTransport>, credentials: ChatCredentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Starts connecting to `channel` and returns immediately.
    ///
    /// Connection, join and the receive loop run on a spawned task. The
    /// handle yields exactly one [`ChatOutcome`] and then the channel's
    /// messages in delivery order. Must be called within a Tokio runtime.
    pub fn connect(&self, channel: impl Into<String>) -> ChatHandle {
        let channel = channel.into();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_connection(
            Arc::clone(&self.transport),
            self.credentials.clone(),
            channel.clone(),
            outcome_tx,
            messages_tx,
            shutdown_rx,
        ));

        ChatHandle {
            channel,
            outcome_rx: Some(outcome_rx),
            messages_rx,
            shutdown_tx,
            task: Some(task),
        }
    }
}

/// Receiving end of one [`ChatBridge::connect`] call.
///
/// Dropping the handle asks the background task to disconnect.
pub struct ChatHandle {
    channel: String,
    outcome_rx: Option<oneshot::Receiver<ChatOutcome>>,
    messages_rx: mpsc::UnboundedReceiver<ChatMessage>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ChatHandle {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Takes the outcome receiver. Returns `None` after the first call.
    pub fn take_outcome(&mut self) -> Option<oneshot::Receiver<ChatOutcome>> {
        self.outcome_rx.take()
    }

    /// Waits for the connection outcome. `None` once it has been taken.
    pub async fn outcome(&mut self) -> Option<ChatOutcome> {
        let rx = self.outcome_rx.take()?;
        Some(rx.await.unwrap_or(ChatOutcome::Failed(ChatError::Closed)))
    }

    /// Next message in delivery order; `None` once the connection has ended
    /// and every delivered message has been read.
    pub async fn next_message(&mut self) -> Option<ChatMessage> {
        self.messages_rx.recv().await
    }

    /// Stops the connection and waits for the background task to finish.
    pub async fn disconnect(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                warn!(%error, channel = %self.channel, "chat task failed");
            }
        }
    }
}

impl Drop for ChatHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn run_connection(
    transport: Arc<dyn ChatTransport>,
    credentials: ChatCredentials,
    channel: String,
    outcome_tx: oneshot::Sender<ChatOutcome>,
    messages_tx: mpsc::UnboundedSender<ChatMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let connected = tokio::select! {
        biased;
        _ = shutdown_requested(&mut shutdown_rx) => Err(ChatError::Cancelled),
        result = transport.connect(&credentials) => result,
    };
    let mut link = match connected {
        Ok(link) => link,
        Err(error) => {
            warn!(%error, %channel, "chat connect failed");
            let _ = outcome_tx.send(ChatOutcome::Failed(error));
            return;
        }
    };

    if let Err(error) = link.join(&channel).await {
        warn!(%error, %channel, "chat join failed");
        let _ = outcome_tx.send(ChatOutcome::Failed(error));
        close_link(link.as_mut(), &channel).await;
        return;
    }
    info!(%channel, "chat connected");
    let _ = outcome_tx.send(ChatOutcome::Connected);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown_rx) => {
                debug!(%channel, "chat shutdown requested");
                break;
            }
            next = link.next_message() => match next {
                Ok(Some(message)) => {
                    if messages_tx.send(message).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    info!(%channel, "chat stream ended");
                    break;
                }
                Err(error) => {
                    warn!(%error, %channel, "chat receive failed");
                    break;
                }
            }
        }
    }
    close_link(link.as_mut(), &channel).await;
}

async fn close_link(link: &mut dyn ChatLink, channel: &str) {
    if let Err(error) = link.disconnect().await {
        debug!(%error, %channel, "chat disconnect failed");
    }
}

/// Resolves once shutdown is signalled or every sender is gone.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

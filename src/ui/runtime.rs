//! The UI event loop: terminal input, background results and chat traffic
//! multiplexed onto one task that owns the [`Model`].

use std::sync::Arc;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::feed::ChatFeed;
use super::keymap::intent_for;
use super::state::{Command, Model, Msg};
use super::terminal::TerminalGuard;
use super::view::render;
use crate::api::HelixClient;
use crate::chat::ChatBridge;
use crate::error::TwitchTuiError;
use crate::util::BrowserLauncher;

pub struct App {
    model: Model,
    helix: HelixClient,
    bridge: ChatBridge,
    browser: Arc<dyn BrowserLauncher>,
}

impl App {
    pub fn new(
        helix: HelixClient,
        bridge: ChatBridge,
        browser: Arc<dyn BrowserLauncher>,
        quit_on_chat_failure: bool,
    ) -> Self {
        Self {
            model: Model::new(quit_on_chat_failure),
            helix,
            bridge,
            browser,
        }
    }

    /// Runs until the user quits. The terminal is restored on every exit
    /// path.
    pub async fn run(mut self) -> Result<(), TwitchTuiError> {
        let mut terminal = TerminalGuard::enter().map_err(terminal_error)?;
        let (width, height) = terminal.size().map_err(terminal_error)?;
        self.model.update(Msg::Resized { width, height });

        let (tx, mut rx) = mpsc::unbounded_channel();
        self.reload_streams(&tx);

        let mut events = EventStream::new();
        let mut chat: Option<ChatFeed> = None;

        let result = loop {
            if let Err(error) = terminal.draw(&render(&self.model)) {
                break Err(terminal_error(error));
            }
            self.model.mark_rendered();

            let msg = tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => match intent_for(&key) {
                        Some(intent) => Msg::Intent(intent),
                        None => continue,
                    },
                    Some(Ok(Event::Resize(width, height))) => Msg::Resized { width, height },
                    Some(Ok(_)) => continue,
                    Some(Err(error)) => break Err(terminal_error(error)),
                    None => break Ok(()),
                },
                Some(msg) = rx.recv() => msg,
                Some(msg) = next_chat_event(&mut chat) => msg,
            };

            let Some(command) = self.model.update(msg) else {
                continue;
            };
            debug!(?command, "executing command");
            match command {
                Command::Quit => break Ok(()),
                Command::Abort(error) => break Err(TwitchTuiError::Chat(error)),
                command => self.execute(command, &tx, &mut chat),
            }
        };

        if let Some(feed) = chat.take() {
            feed.disconnect().await;
        }
        info!(renders = self.model.renders, "ui stopped");
        result
    }

    fn execute(
        &self,
        command: Command,
        tx: &mpsc::UnboundedSender<Msg>,
        chat: &mut Option<ChatFeed>,
    ) {
        match command {
            Command::Quit | Command::Abort(_) => {}
            Command::OpenInBrowser(url) => {
                if let Err(error) = self.browser.open(&url) {
                    warn!(%error, %url, "failed to open browser");
                    let _ = tx.send(Msg::BrowserFailed(error.to_string()));
                }
            }
            Command::ConnectChat {
                channel,
                generation,
            } => {
                retire(chat.take());
                *chat = Some(ChatFeed::new(self.bridge.connect(channel), generation));
            }
            Command::DisconnectChat => retire(chat.take()),
            Command::ReloadStreams => self.reload_streams(tx),
        }
    }

    fn reload_streams(&self, tx: &mpsc::UnboundedSender<Msg>) {
        let helix = self.helix.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = helix
                .followed_streams()
                .await
                .map_err(|error| error.to_string());
            let _ = tx.send(Msg::StreamsLoaded(result));
        });
    }
}

/// Disconnects in the background so the loop never waits on the network.
fn retire(chat: Option<ChatFeed>) {
    if let Some(feed) = chat {
        debug!(generation = feed.generation(), "retiring chat");
        tokio::spawn(feed.disconnect());
    }
}

/// Next event from the active chat; pending forever when there is none.
async fn next_chat_event(chat: &mut Option<ChatFeed>) -> Option<Msg> {
    match chat.as_mut() {
        Some(feed) => feed.next_event().await,
        None => std::future::pending().await,
    }
}

fn terminal_error(error: std::io::Error) -> TwitchTuiError {
    TwitchTuiError::Terminal(error.to_string())
}

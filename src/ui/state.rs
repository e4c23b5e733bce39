//! Elm-style model and update function for the terminal UI.

use crate::api::Stream;
use crate::chat::{ChatError, ChatMessage, ChatOutcome};
use crate::util::stream_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Streams,
    Chat { channel: String, connected: bool },
}

/// User intents, already decoded from key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Quit,
    Up,
    Down,
    Select,
    OpenInBrowser,
    Reload,
    Back,
}

/// Everything that can change the model.
///
/// Chat events carry the generation of the connection that produced them;
/// events from an earlier connection are ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Intent(Intent),
    Resized { width: u16, height: u16 },
    StreamsLoaded(Result<Vec<Stream>, String>),
    ChatOutcome { generation: u64, outcome: ChatOutcome },
    ChatMessage { generation: u64, message: ChatMessage },
    ChatClosed { generation: u64 },
    BrowserFailed(String),
}

/// Side effects requested by [`Model::update`], executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Stop the UI and report the chat failure.
    Abort(ChatError),
    OpenInBrowser(String),
    ConnectChat { channel: String, generation: u64 },
    DisconnectChat,
    ReloadStreams,
}

#[derive(Debug, Clone)]
pub struct Model {
    pub streams: Vec<Stream>,
    pub cursor: usize,
    pub screen: Screen,
    /// Messages of the current chat, append-only while it is open.
    pub messages: Vec<ChatMessage>,
    pub generation: u64,
    pub renders: u64,
    pub status: Option<String>,
    pub loading: bool,
    pub width: u16,
    pub height: u16,
    pub quit_on_chat_failure: bool,
    chat_closed: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Model {
    pub fn new(quit_on_chat_failure: bool) -> Self {
        Self {
            streams: Vec::new(),
            cursor: 0,
            screen: Screen::Streams,
            messages: Vec::new(),
            generation: 0,
            renders: 0,
            status: None,
            loading: true,
            width: 80,
            height: 24,
            quit_on_chat_failure,
            chat_closed: false,
        }
    }

    pub fn selected(&self) -> Option<&Stream> {
        self.streams.get(self.cursor)
    }

    pub fn mark_rendered(&mut self) {
        self.renders = self.renders.wrapping_add(1);
    }

    pub fn update(&mut self, msg: Msg) -> Option<Command> {
        match msg {
            Msg::Intent(intent) => self.on_intent(intent),
            Msg::Resized { width, height } => {
                self.width = width;
                self.height = height;
                None
            }
            Msg::StreamsLoaded(Ok(streams)) => {
                self.streams = streams;
                self.cursor = self.cursor.min(self.streams.len().saturating_sub(1));
                self.loading = false;
                self.status = None;
                None
            }
            Msg::StreamsLoaded(Err(error)) => {
                self.loading = false;
                self.status = Some(format!("failed to load streams: {error}"));
                None
            }
            Msg::ChatOutcome {
                generation,
                outcome,
            } => self.on_chat_outcome(generation, outcome),
            Msg::ChatMessage {
                generation,
                message,
            } => {
                if self.is_current_chat(generation) {
                    self.messages.push(message);
                }
                None
            }
            Msg::ChatClosed { generation } => {
                if self.is_current_chat(generation) {
                    self.chat_closed = true;
                    if let Screen::Chat { connected, .. } = &mut self.screen {
                        *connected = false;
                    }
                    self.status = Some("chat disconnected".into());
                }
                None
            }
            Msg::BrowserFailed(error) => {
                self.status = Some(format!("could not open browser: {error}"));
                None
            }
        }
    }

    fn on_intent(&mut self, intent: Intent) -> Option<Command> {
        match (intent, &self.screen) {
            (Intent::Quit, _) => Some(Command::Quit),
            (Intent::Up, Screen::Streams) => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            (Intent::Down, Screen::Streams) => {
                if self.cursor + 1 < self.streams.len() {
                    self.cursor += 1;
                }
                None
            }
            (Intent::Select, Screen::Streams) => {
                let channel = self.selected()?.user_login.clone();
                self.generation += 1;
                self.messages.clear();
                self.chat_closed = false;
                self.status = None;
                self.screen = Screen::Chat {
                    channel: channel.clone(),
                    connected: false,
                };
                Some(Command::ConnectChat {
                    channel,
                    generation: self.generation,
                })
            }
            (Intent::OpenInBrowser, Screen::Streams) => {
                let login = &self.selected()?.user_login;
                Some(Command::OpenInBrowser(stream_url(login)))
            }
            (Intent::OpenInBrowser, Screen::Chat { channel, .. }) => {
                Some(Command::OpenInBrowser(stream_url(channel)))
            }
            (Intent::Reload, Screen::Streams) => {
                self.loading = true;
                Some(Command::ReloadStreams)
            }
            (Intent::Back, Screen::Chat { .. }) => {
                self.leave_chat();
                Some(Command::DisconnectChat)
            }
            _ => None,
        }
    }

    fn on_chat_outcome(&mut self, generation: u64, outcome: ChatOutcome) -> Option<Command> {
        if !self.is_current_chat(generation) {
            return None;
        }
        match outcome {
            ChatOutcome::Connected => {
                if self.chat_closed {
                    return None;
                }
                if let Screen::Chat { connected, .. } = &mut self.screen {
                    *connected = true;
                }
                None
            }
            ChatOutcome::Failed(error) => {
                self.leave_chat();
                self.status = Some(format!("chat failed: {error}"));
                if self.quit_on_chat_failure {
                    Some(Command::Abort(error))
                } else {
                    Some(Command::DisconnectChat)
                }
            }
        }
    }

    fn leave_chat(&mut self) {
        // Bumping the generation drops any event still in flight.
        self.generation += 1;
        self.screen = Screen::Streams;
    }

    fn is_current_chat(&self, generation: u64) -> bool {
        generation == self.generation && matches!(self.screen, Screen::Chat { .. })
    }
}

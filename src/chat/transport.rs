//! Chat transport seam and the Twitch IRC-over-WebSocket implementation.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, trace, warn};

use super::error::ChatError;
use super::irc::{parse_line, IrcMessage};
use super::message::{ChatCredentials, ChatMessage};

/// Time allowed between sending credentials and the server's welcome.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

const CAPABILITIES: &str = "CAP REQ :twitch.tv/tags twitch.tv/commands";

/// Opens authenticated chat connections.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(&self, credentials: &ChatCredentials)
        -> Result<Box<dyn ChatLink>, ChatError>;
}

/// One authenticated chat connection.
#[async_trait]
pub trait ChatLink: Send {
    async fn join(&mut self, channel: &str) -> Result<(), ChatError>;

    /// Next chat line or join marker, in delivery order. `Ok(None)` once
    /// the server ends the stream.
    async fn next_message(&mut self) -> Result<Option<ChatMessage>, ChatError>;

    async fn disconnect(&mut self) -> Result<(), ChatError>;
}

type ChatSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Twitch chat over the IRC WebSocket gateway.
#[derive(Debug, Clone)]
pub struct TwitchIrcTransport {
    url: String,
    login_timeout: Duration,
}

impl TwitchIrcTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            login_timeout: LOGIN_TIMEOUT,
        }
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }
}

#[async_trait]
impl ChatTransport for TwitchIrcTransport {
    async fn connect(
        &self,
        credentials: &ChatCredentials,
    ) -> Result<Box<dyn ChatLink>, ChatError> {
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(map_connect_error)?;
        let mut link = IrcLink {
            socket,
            pending: VecDeque::new(),
            login: credentials.login.to_ascii_lowercase(),
            channel: None,
        };

        let nick = format!("NICK {}", link.login);
        link.send_line(CAPABILITIES).await?;
        link.send_line(&format!("PASS {}", credentials.oauth_token))
            .await?;
        link.send_line(&nick).await?;

        let welcomed = tokio::time::timeout(self.login_timeout, link.await_welcome()).await;
        match welcomed {
            Ok(Ok(())) => {
                debug!(login = %link.login, "chat login accepted");
                Ok(Box::new(link))
            }
            Ok(Err(error)) => Err(error),
            Err(_) => Err(ChatError::Connect(format!(
                "no welcome from chat server within {}s",
                self.login_timeout.as_secs()
            ))),
        }
    }
}

struct IrcLink {
    socket: ChatSocket,
    pending: VecDeque<String>,
    login: String,
    channel: Option<String>,
}

impl IrcLink {
    async fn send_line(&mut self, line: &str) -> Result<(), ChatError> {
        self.socket
            .send(Message::Text(line.into()))
            .await
            .map_err(|error| ChatError::Protocol(format!("send failed: {error}")))
    }

    /// Next raw line, or `None` when the socket is closed.
    async fn next_line(&mut self) -> Result<Option<String>, ChatError> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Ok(Some(line));
            }
            let frame = match self.socket.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    return Ok(None)
                }
                Some(Err(error)) => {
                    return Err(ChatError::Protocol(format!("receive failed: {error}")))
                }
            };
            match frame {
                Message::Text(text) => self.buffer(text.as_str()),
                Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                    Ok(text) => self.buffer(text),
                    Err(error) => debug!(%error, len = bytes.len(), "ignoring non-utf8 binary frame"),
                },
                // tungstenite queues the pong for websocket pings itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                Message::Close(_) => return Ok(None),
            }
        }
    }

    fn buffer(&mut self, payload: &str) {
        self.pending.extend(
            payload
                .split("\r\n")
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string),
        );
    }

    async fn await_welcome(&mut self) -> Result<(), ChatError> {
        loop {
            let Some(line) = self.next_line().await? else {
                return Err(ChatError::Closed);
            };
            let Some(message) = parse_line(&line) else {
                continue;
            };
            match message.command.as_str() {
                "001" => return Ok(()),
                "PING" => self.pong(&message).await?,
                "NOTICE" if is_login_failure(&message) => {
                    return Err(ChatError::Authentication(
                        message.trailing().unwrap_or_default().to_string(),
                    ));
                }
                _ => trace!(%line, "ignoring pre-login line"),
            }
        }
    }

    async fn pong(&mut self, ping: &IrcMessage) -> Result<(), ChatError> {
        let reply = match ping.trailing() {
            Some(server) => format!("PONG :{server}"),
            None => "PONG".to_string(),
        };
        self.send_line(&reply).await
    }
}

#[async_trait]
impl ChatLink for IrcLink {
    async fn join(&mut self, channel: &str) -> Result<(), ChatError> {
        let channel = normalize_channel(channel);
        if channel.is_empty() {
            return Err(ChatError::Protocol("channel name is empty".into()));
        }
        self.send_line(&format!("JOIN #{channel}")).await?;
        self.channel = Some(channel);
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<ChatMessage>, ChatError> {
        loop {
            let Some(line) = self.next_line().await? else {
                return Ok(None);
            };
            let Some(message) = parse_line(&line) else {
                continue;
            };
            match message.command.as_str() {
                "PRIVMSG" => {
                    let username = message
                        .tag("display-name")
                        .or_else(|| message.nick())
                        .unwrap_or_default()
                        .to_string();
                    let text = message.trailing().unwrap_or_default().to_string();
                    return Ok(Some(ChatMessage::new(username, text)));
                }
                "JOIN" if message
                    .nick()
                    .is_some_and(|nick| nick.eq_ignore_ascii_case(&self.login)) =>
                {
                    return Ok(Some(ChatMessage::joined(line)));
                }
                "PING" => self.pong(&message).await?,
                "RECONNECT" => {
                    debug!("chat server requested reconnect");
                    return Ok(None);
                }
                "NOTICE" if is_login_failure(&message) => {
                    return Err(ChatError::Authentication(
                        message.trailing().unwrap_or_default().to_string(),
                    ));
                }
                _ => trace!(%line, "ignoring chat line"),
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), ChatError> {
        if let Some(channel) = self.channel.take() {
            if let Err(error) = self.send_line(&format!("PART #{channel}")).await {
                warn!(%error, "failed to leave channel");
            }
        }
        match self.socket.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(error) => Err(ChatError::Protocol(format!("close failed: {error}"))),
        }
    }
}

fn normalize_channel(channel: &str) -> String {
    channel.trim().trim_start_matches('#').to_ascii_lowercase()
}

fn is_login_failure(message: &IrcMessage) -> bool {
    let text = message.trailing().unwrap_or_default();
    text.contains("Login authentication failed") || text.contains("Improperly formatted auth")
}

fn map_connect_error(error: WsError) -> ChatError {
    match error {
        WsError::Http(response) => {
            let status = response.status().as_u16();
            if matches!(status, 401 | 403) {
                ChatError::Authentication(format!("chat handshake rejected with status {status}"))
            } else {
                ChatError::Connect(format!("chat handshake failed with status {status}"))
            }
        }
        other => ChatError::Connect(other.to_string()),
    }
}

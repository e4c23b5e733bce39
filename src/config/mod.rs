//! Configuration (layered: code > env > defaults).

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::store::{default_app_dir, default_token_path};
use crate::error::TwitchTuiError;

pub const DEFAULT_AUTH_URL: &str = "https://id.twitch.tv/oauth2";
pub const DEFAULT_API_URL: &str = "https://api.twitch.tv/helix";
pub const DEFAULT_CHAT_URL: &str = "wss://irc-ws.chat.twitch.tv:443";
pub const DEFAULT_CALLBACK_PORT: u16 = 7394;
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);
pub const LISTENER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(12);

/// Scopes requested on every authorization. `chat:read` is required by Twitch IRC.
pub const SCOPES: &[&str] = &["user:read:follows", "chat:read"];

/// Application credentials registered with the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"..")
            .finish()
    }
}

/// Local address the provider redirects to after consent.
///
/// The listener binding and the `redirect_uri` sent to the provider are both
/// derived from this one value, so they cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackAddress {
    port: u16,
}

impl CallbackAddress {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.port))
    }
}

impl Default for CallbackAddress {
    fn default() -> Self {
        Self::new(DEFAULT_CALLBACK_PORT)
    }
}

/// Runtime configuration for the whole application.
#[derive(Debug, Clone)]
pub struct TwitchTuiConfig {
    pub credentials: Credentials,
    pub auth_url: String,
    pub api_url: String,
    pub chat_url: String,
    pub token_path: PathBuf,
    pub callback: CallbackAddress,
    pub callback_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub quit_on_chat_failure: bool,
    pub log_filter: String,
    pub log_path: PathBuf,
}

impl TwitchTuiConfig {
    /// Defaults for everything except the credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            chat_url: DEFAULT_CHAT_URL.to_string(),
            token_path: default_token_path(),
            callback: CallbackAddress::default(),
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
            shutdown_timeout: LISTENER_SHUTDOWN_TIMEOUT,
            quit_on_chat_failure: false,
            log_filter: "info".to_string(),
            log_path: default_app_dir().join("twitchtui.log"),
        }
    }

    /// Load from environment variables (`TWITCH_CLIENT_ID`, `TWITCH_CLIENT_SECRET`, ...).
    pub fn from_env() -> Result<Self, TwitchTuiError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TwitchTuiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                TwitchTuiError::Configuration(format!("{key} is not set"))
            })
        };

        let credentials = Credentials::new(
            require("TWITCH_CLIENT_ID")?,
            require("TWITCH_CLIENT_SECRET")?,
        );
        let mut config = Self::new(credentials);

        if let Some(url) = get("TWITCHTUI_AUTH_URL") {
            config.auth_url = trim_base_url(&url);
        }
        if let Some(url) = get("TWITCHTUI_API_URL") {
            config.api_url = trim_base_url(&url);
        }
        if let Some(url) = get("TWITCHTUI_CHAT_URL") {
            config.chat_url = url;
        }
        if let Some(path) = get("TWITCHTUI_TOKEN_PATH") {
            config.token_path = PathBuf::from(path);
        }
        if let Some(port) = get("TWITCHTUI_CALLBACK_PORT") {
            let port = parse_number::<u16>("TWITCHTUI_CALLBACK_PORT", &port)?;
            config.callback = CallbackAddress::new(port);
        }
        if let Some(secs) = get("TWITCHTUI_CALLBACK_TIMEOUT_SECS") {
            let secs = parse_number::<u64>("TWITCHTUI_CALLBACK_TIMEOUT_SECS", &secs)?;
            config.callback_timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = get("TWITCHTUI_QUIT_ON_CHAT_FAILURE") {
            config.quit_on_chat_failure = parse_flag("TWITCHTUI_QUIT_ON_CHAT_FAILURE", &flag)?;
        }
        if let Some(filter) = get("TWITCHTUI_LOG") {
            config.log_filter = filter;
        }
        if let Some(path) = get("TWITCHTUI_LOG_PATH") {
            config.log_path = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = trim_base_url(&url.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = trim_base_url(&url.into());
        self
    }

    pub fn with_chat_url(mut self, url: impl Into<String>) -> Self {
        self.chat_url = url.into();
        self
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn with_callback(mut self, callback: CallbackAddress) -> Self {
        self.callback = callback;
        self
    }

    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, TwitchTuiError> {
    raw.trim()
        .parse()
        .map_err(|_| TwitchTuiError::Configuration(format!("{key} must be a number, got '{raw}'")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, TwitchTuiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TwitchTuiError::Configuration(format!(
            "{key} must be true or false, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_client_id_is_a_configuration_error() {
        let err = TwitchTuiConfig::from_lookup(lookup(&[("TWITCH_CLIENT_SECRET", "s")]))
            .unwrap_err();
        match err {
            TwitchTuiError::Configuration(msg) => assert!(msg.contains("TWITCH_CLIENT_ID")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let result = TwitchTuiConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_CLIENT_SECRET", "  "),
        ]));
        assert!(matches!(result, Err(TwitchTuiError::Configuration(_))));
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = TwitchTuiConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.credentials.client_id, "id");
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.callback.port(), 7394);
        assert_eq!(config.callback.redirect_uri(), "http://localhost:7394");
        assert_eq!(config.shutdown_timeout, Duration::from_secs(12));
        assert!(!config.quit_on_chat_failure);
        assert!(config.token_path.ends_with(".twitchtui/.token"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = TwitchTuiConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_CLIENT_SECRET", "secret"),
            ("TWITCHTUI_AUTH_URL", "http://127.0.0.1:9000/oauth2/"),
            ("TWITCHTUI_CALLBACK_PORT", "8123"),
            ("TWITCHTUI_CALLBACK_TIMEOUT_SECS", "30"),
            ("TWITCHTUI_QUIT_ON_CHAT_FAILURE", "yes"),
            ("TWITCHTUI_TOKEN_PATH", "/tmp/tok.json"),
        ]))
        .unwrap();
        assert_eq!(config.auth_url, "http://127.0.0.1:9000/oauth2");
        assert_eq!(config.callback.redirect_uri(), "http://localhost:8123");
        assert_eq!(config.callback_timeout, Duration::from_secs(30));
        assert!(config.quit_on_chat_failure);
        assert_eq!(config.token_path, PathBuf::from("/tmp/tok.json"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = TwitchTuiConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_CLIENT_SECRET", "secret"),
            ("TWITCHTUI_CALLBACK_PORT", "99999"),
        ]));
        assert!(matches!(result, Err(TwitchTuiError::Configuration(_))));
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let debug = format!("{:?}", Credentials::new("id", "hunter2"));
        assert!(debug.contains("id"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn callback_binds_loopback_on_configured_port() {
        let callback = CallbackAddress::new(7394);
        assert_eq!(callback.bind_addr().to_string(), "127.0.0.1:7394");
    }
}

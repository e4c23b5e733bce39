#![allow(dead_code)]

use std::net::TcpListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use twitchtui::auth::{AuthError, AuthNotice, AuthNotifier, PersistedSession, TokenStore};
use twitchtui::config::{CallbackAddress, Credentials, TwitchTuiConfig};
use twitchtui::util::BrowserLauncher;
use url::Url;

pub const CLIENT_ID: &str = "cid";
pub const CLIENT_SECRET: &str = "secret";

#[derive(Default)]
pub struct InMemoryTokenStore {
    session: Mutex<Option<PersistedSession>>,
    saves: Mutex<usize>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(session: PersistedSession) -> Self {
        let store = Self::default();
        *store.session.lock().expect("store lock poisoned") = Some(session);
        store
    }

    pub fn get(&self) -> Option<PersistedSession> {
        self.session.lock().expect("store lock poisoned").clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().expect("store lock poisoned")
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<PersistedSession>, AuthError> {
        Ok(self.get())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), AuthError> {
        *self.session.lock().expect("store lock poisoned") = Some(session.clone());
        *self.saves.lock().expect("store lock poisoned") += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.session.lock().expect("store lock poisoned").take();
        Ok(())
    }
}

/// Store whose writes always fail.
pub struct ReadOnlyTokenStore;

impl TokenStore for ReadOnlyTokenStore {
    fn load(&self) -> Result<Option<PersistedSession>, AuthError> {
        Ok(None)
    }

    fn save(&self, _session: &PersistedSession) -> Result<(), AuthError> {
        Err(AuthError::Io("read-only file system".into()))
    }

    fn clear(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Stands in for the user: when asked to open the authorize URL it follows
/// the provider redirect to `redirect_uri` with `query` appended.
pub struct RedirectingBrowser {
    query: String,
    fail_launch: bool,
    opened: Mutex<Vec<String>>,
}

impl RedirectingBrowser {
    pub fn with_code(code: &str) -> Self {
        Self::with_query(&format!("code={code}&scope=user%3Aread%3Afollows"))
    }

    pub fn with_query(query: &str) -> Self {
        Self {
            query: query.to_string(),
            fail_launch: false,
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Reports a launch failure but still follows the redirect, as a user
    /// pasting the URL by hand would.
    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("browser lock poisoned").clone()
    }
}

impl BrowserLauncher for RedirectingBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        self.opened
            .lock()
            .expect("browser lock poisoned")
            .push(url.to_string());

        let authorize = Url::parse(url).expect("authorize url");
        let redirect_uri = authorize
            .query_pairs()
            .find(|(key, _)| key == "redirect_uri")
            .map(|(_, value)| value.into_owned())
            .expect("redirect_uri parameter");
        let target = format!(
            "{}/?{}",
            redirect_uri.replace("localhost", "127.0.0.1"),
            self.query
        );
        tokio::spawn(async move {
            let _ = reqwest::get(target).await;
        });

        if self.fail_launch {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no browser available",
            ));
        }
        Ok(())
    }
}

/// Records URLs and never redirects: the user walked away.
#[derive(Default)]
pub struct IdleBrowser {
    opened: Mutex<Vec<String>>,
}

impl IdleBrowser {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("browser lock poisoned").clone()
    }
}

impl BrowserLauncher for IdleBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        self.opened
            .lock()
            .expect("browser lock poisoned")
            .push(url.to_string());
        Ok(())
    }
}

/// Collects notices for later assertions.
pub fn recording_notifier() -> (AuthNotifier, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let notifier: AuthNotifier = Arc::new(move |notice: &AuthNotice| {
        let label = match notice {
            AuthNotice::OpeningBrowser { .. } => "opening_browser",
            AuthNotice::BrowserLaunchFailed { .. } => "browser_launch_failed",
            AuthNotice::WaitingForCallback { .. } => "waiting_for_callback",
            AuthNotice::CallbackReceived => "callback_received",
            AuthNotice::Authorized { .. } => "authorized",
        };
        sink.lock().expect("notice lock poisoned").push(label.to_string());
    });
    (notifier, seen)
}

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .expect("local addr")
        .port()
}

pub fn test_config(auth_url: &str, token_path: &Path) -> TwitchTuiConfig {
    TwitchTuiConfig::new(Credentials::new(CLIENT_ID, CLIENT_SECRET))
        .with_auth_url(auth_url)
        .with_api_url(auth_url)
        .with_token_path(token_path)
        .with_callback(CallbackAddress::new(free_port()))
        .with_callback_timeout(Duration::from_secs(10))
        .with_shutdown_timeout(Duration::from_secs(2))
}

pub fn validate_body(login: &str, user_id: &str, scopes: &[&str]) -> Value {
    json!({
        "client_id": CLIENT_ID,
        "login": login,
        "scopes": scopes,
        "user_id": user_id,
        "expires_in": 14_400
    })
}

pub fn token_body(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "expires_in": 14_400,
        "refresh_token": "refresh-1",
        "scope": ["user:read:follows"],
        "token_type": "bearer"
    })
}

pub fn persisted(login: &str, token: &str) -> PersistedSession {
    PersistedSession {
        client_id: CLIENT_ID.to_string(),
        login: login.to_string(),
        user_id: "1".to_string(),
        expires_in: 60,
        scopes: vec!["user:read:follows".to_string()],
        token: token.to_string(),
    }
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::callback::{CallbackPayload, CallbackServer};
use super::error::AuthError;
use super::exchange::{authorize_url, CodeExchanger};
use super::store::TokenStore;
use super::token::Session;
use super::validator::TokenValidator;
use crate::config::{CallbackAddress, Credentials, TwitchTuiConfig, SCOPES};
use crate::util::BrowserLauncher;

/// Progress of an interactive authorization, for the caller to display.
#[derive(Debug)]
pub enum AuthNotice {
    OpeningBrowser { url: String },
    BrowserLaunchFailed { url: String, error: AuthError },
    WaitingForCallback { redirect_uri: String },
    CallbackReceived,
    Authorized { login: String },
}

/// Receives [`AuthNotice`]s; the manager itself never prints.
pub type AuthNotifier = Arc<dyn Fn(&AuthNotice) + Send + Sync>;

/// Produces a validated [`Session`], reusing the cached one when it still
/// validates and running the browser authorization-code flow otherwise.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use twitchtui::auth::{AuthorizationManager, FileTokenStore};
/// use twitchtui::config::TwitchTuiConfig;
/// use twitchtui::util::SystemBrowser;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TwitchTuiConfig::from_env()?;
/// let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
/// let manager = AuthorizationManager::new(&config, store, Arc::new(SystemBrowser));
/// let session = manager.authorize().await?;
/// println!("logged in as {}", session.login());
/// # Ok(())
/// # }
/// ```
pub struct AuthorizationManager {
    credentials: Credentials,
    auth_url: String,
    callback: CallbackAddress,
    callback_timeout: Duration,
    shutdown_timeout: Duration,
    store: Arc<dyn TokenStore>,
    validator: TokenValidator,
    exchanger: CodeExchanger,
    browser: Arc<dyn BrowserLauncher>,
    notifier: Option<AuthNotifier>,
}

impl AuthorizationManager {
    pub fn new(
        config: &TwitchTuiConfig,
        store: Arc<dyn TokenStore>,
        browser: Arc<dyn BrowserLauncher>,
    ) -> Self {
        let client = reqwest::Client::new();
        let redirect_uri = config.callback.redirect_uri();
        Self {
            credentials: config.credentials.clone(),
            auth_url: config.auth_url.clone(),
            callback: config.callback,
            callback_timeout: config.callback_timeout,
            shutdown_timeout: config.shutdown_timeout,
            store,
            validator: TokenValidator::with_client(client.clone(), &config.auth_url),
            exchanger: CodeExchanger::new(
                &config.auth_url,
                config.credentials.clone(),
                redirect_uri,
            )
            .with_client(client),
            browser,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: AuthNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Cache first, interactive flow otherwise. Ctrl-C cancels the wait for
    /// the browser redirect.
    pub async fn authorize(&self) -> Result<Session, AuthError> {
        self.authorize_with_cancel(ctrl_c()).await
    }

    /// Like [`authorize`](Self::authorize) with a caller-supplied cancellation
    /// signal.
    pub async fn authorize_with_cancel<F>(&self, cancel: F) -> Result<Session, AuthError>
    where
        F: Future<Output = ()>,
    {
        if let Some(session) = self.cached_session().await? {
            return Ok(session);
        }
        self.interactive(cancel).await
    }

    /// Always runs the interactive flow, replacing whatever is cached.
    pub async fn login(&self) -> Result<Session, AuthError> {
        self.login_with_cancel(ctrl_c()).await
    }

    pub async fn login_with_cancel<F>(&self, cancel: F) -> Result<Session, AuthError>
    where
        F: Future<Output = ()>,
    {
        self.interactive(cancel).await
    }

    /// Revalidates the cached session.
    ///
    /// `Ok(None)` when nothing usable is cached: no file, an unreadable file,
    /// or a token the provider rejects with 401. The stale token is sent to
    /// the provider exactly once.
    pub async fn cached_session(&self) -> Result<Option<Session>, AuthError> {
        let cached = match self.store.load() {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                debug!("no cached session");
                return Ok(None);
            }
            Err(error) => {
                warn!(%error, "ignoring unreadable cached session");
                return Ok(None);
            }
        };
        if cached.token.is_empty() {
            debug!("cached session has no token");
            return Ok(None);
        }

        match self.validator.validate(&cached.token).await {
            Ok(session) => {
                info!(login = %session.login(), "reusing cached session");
                Ok(Some(session))
            }
            Err(AuthError::InvalidToken) => {
                info!(login = %cached.login, "cached session rejected; re-authorizing");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Removes the cached session.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear()
    }

    async fn interactive<F>(&self, cancel: F) -> Result<Session, AuthError>
    where
        F: Future<Output = ()>,
    {
        let redirect_uri = self.callback.redirect_uri();
        let url = authorize_url(
            &self.auth_url,
            &self.credentials.client_id,
            &redirect_uri,
            SCOPES,
        )?;

        // Bind before the browser opens so the redirect cannot beat the listener.
        let (server, payload_rx) =
            CallbackServer::start(self.callback.bind_addr(), self.shutdown_timeout).await?;

        self.notify(AuthNotice::OpeningBrowser {
            url: url.to_string(),
        });
        if let Err(error) = self.browser.open(url.as_str()) {
            let error = AuthError::BrowserLaunch(error.to_string());
            warn!(%error, "continuing without browser; the URL must be opened manually");
            self.notify(AuthNotice::BrowserLaunchFailed {
                url: url.to_string(),
                error,
            });
        }
        self.notify(AuthNotice::WaitingForCallback {
            redirect_uri: redirect_uri.clone(),
        });

        let waited = tokio::select! {
            payload = payload_rx => payload.map_err(|_| {
                AuthError::Listener("callback listener exited before a redirect arrived".into())
            }),
            _ = tokio::time::sleep(self.callback_timeout) => {
                Err(AuthError::CallbackTimeout(self.callback_timeout))
            }
            _ = cancel => Err(AuthError::Cancelled),
        };
        let stopped = server.stop().await;
        let payload = waited?;
        stopped?;

        let code = match payload {
            CallbackPayload::Code(code) => code,
            CallbackPayload::Denied { error, description } => {
                return Err(AuthError::AccessDenied(description.unwrap_or(error)));
            }
        };
        self.notify(AuthNotice::CallbackReceived);

        let token = self.exchanger.exchange(code).await?;
        debug!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            "authorization code exchanged"
        );

        let session = self.validator.validate(&token.access_token).await?;
        if let Err(error) = self.store.save(&session.to_persisted()) {
            warn!(%error, "failed to persist session; continuing with in-memory session");
        }
        info!(login = %session.login(), "authorized");
        self.notify(AuthNotice::Authorized {
            login: session.login().to_string(),
        });
        Ok(session)
    }

    fn notify(&self, notice: AuthNotice) {
        if let Some(notifier) = &self.notifier {
            notifier(&notice);
        }
    }
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

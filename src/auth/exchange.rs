use reqwest::StatusCode;
use url::Url;

use super::error::AuthError;
use super::token::{AuthorizationCode, SessionToken};
use crate::config::Credentials;

/// Builds the browser URL that starts the authorization-code grant.
pub fn authorize_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[&str],
) -> Result<Url, AuthError> {
    let base = format!("{}/authorize", auth_url.trim_end_matches('/'));
    let url = Url::parse_with_params(
        &base,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", &scopes.join(" ")),
        ],
    )?;
    Ok(url)
}

/// Trades an authorization code for a token at `{auth_url}/token`.
#[derive(Debug, Clone)]
pub struct CodeExchanger {
    client: reqwest::Client,
    token_url: String,
    credentials: Credentials,
    redirect_uri: String,
}

impl CodeExchanger {
    pub fn new(auth_url: &str, credentials: Credentials, redirect_uri: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: format!("{}/token", auth_url.trim_end_matches('/')),
            credentials,
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Any non-200 response is [`AuthError::Transport`] carrying the status.
    pub async fn exchange(&self, code: AuthorizationCode) -> Result<SessionToken, AuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;
        if resp.status() != StatusCode::OK {
            return Err(AuthError::transport(resp.status(), "Token exchange"));
        }
        resp.json::<SessionToken>()
            .await
            .map_err(|error| AuthError::Decode(format!("token response: {error}")))
    }
}

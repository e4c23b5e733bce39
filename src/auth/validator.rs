use reqwest::StatusCode;
use tracing::debug;

use super::error::AuthError;
use super::token::{Session, ValidateResponse};

/// Checks a token against the provider's `/validate` endpoint.
///
/// # Example
/// ```no_run
/// use twitchtui::auth::TokenValidator;
///
/// # async fn example() -> Result<(), twitchtui::auth::AuthError> {
/// let validator = TokenValidator::new("https://id.twitch.tv/oauth2");
/// let session = validator.validate("access-token").await?;
/// println!("logged in as {}", session.login());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenValidator {
    client: reqwest::Client,
    validate_url: String,
}

impl TokenValidator {
    pub fn new(auth_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), auth_url)
    }

    pub fn with_client(client: reqwest::Client, auth_url: &str) -> Self {
        Self {
            client,
            validate_url: format!("{}/validate", auth_url.trim_end_matches('/')),
        }
    }

    /// 200 yields a [`Session`] stamped with `token`; 401 is
    /// [`AuthError::InvalidToken`]; any other status is [`AuthError::Transport`].
    pub async fn validate(&self, token: &str) -> Result<Session, AuthError> {
        let resp = self
            .client
            .get(&self.validate_url)
            .header("Authorization", format!("OAuth {token}"))
            .send()
            .await?;
        match resp.status() {
            StatusCode::OK => {
                let body: ValidateResponse = resp.json().await.map_err(|error| {
                    AuthError::Decode(format!("validate response: {error}"))
                })?;
                debug!(login = %body.login, expires_in = body.expires_in, "token validated");
                Ok(Session::from_validation(body, token))
            }
            StatusCode::UNAUTHORIZED => Err(AuthError::InvalidToken),
            other => Err(AuthError::transport(other, "Token validation")),
        }
    }
}

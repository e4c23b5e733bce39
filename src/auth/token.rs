use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Single-use code delivered by the provider's redirect.
///
/// Consumed by value when exchanged, so a code cannot be sent twice.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationCode(..)")
    }
}

/// Token endpoint response.
///
/// # Example
/// ```no_run
/// use twitchtui::auth::SessionToken;
///
/// let token: SessionToken = serde_json::from_str(
///     r#"{"access_token":"tok","expires_in":14400,"token_type":"bearer"}"#,
/// )?;
/// assert_eq!(token.access_token, "tok");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<Vec<String>>,
}

/// The validated identity the application runs as.
///
/// Only produced by [`TokenValidator::validate`](super::TokenValidator::validate);
/// `token()` is always the exact string that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    client_id: String,
    login: String,
    user_id: String,
    expires_in: u64,
    scopes: Vec<String>,
    token: String,
    validated_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn from_validation(body: ValidateResponse, token: &str) -> Self {
        Self {
            client_id: body.client_id,
            login: body.login,
            user_id: body.user_id,
            expires_in: body.expires_in,
            scopes: body.scopes,
            token: token.to_string(),
            validated_at: Utc::now(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Seconds the token had left when it was validated.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Approximate expiry instant derived from `expires_in` at validation time.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.validated_at + Duration::seconds(self.expires_in.min(i64::MAX as u64) as i64)
    }

    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            client_id: self.client_id.clone(),
            login: self.login.clone(),
            user_id: self.user_id.clone(),
            expires_in: self.expires_in,
            scopes: self.scopes.clone(),
            token: self.token.clone(),
        }
    }
}

/// On-disk shape of a [`Session`].
///
/// A loaded `PersistedSession` is only a candidate: its token must be
/// revalidated before the application trusts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub client_id: String,
    pub login: String,
    pub user_id: String,
    pub expires_in: u64,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

/// Body of a successful `/validate` call.
#[derive(Debug, Deserialize)]
pub(crate) struct ValidateResponse {
    pub client_id: String,
    pub login: String,
    pub user_id: String,
    pub expires_in: u64,
    #[serde(default)]
    pub scopes: Vec<String>,
}

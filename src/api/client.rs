use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::auth::Session;
use crate::error::TwitchTuiError;

/// Helix list envelope: `{"data": [...], "pagination": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelixErrorBody {
    #[serde(default)]
    message: String,
}

/// Authenticated client for the Helix REST API.
///
/// Cheap to clone; the session is shared.
#[derive(Debug, Clone)]
pub struct HelixClient {
    client: reqwest::Client,
    api_url: String,
    session: Arc<Session>,
}

impl HelixClient {
    pub fn new(api_url: &str, session: Arc<Session>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ResponseData<T>, TwitchTuiError> {
        let url = format!("{}/{}", self.api_url, path.trim_start_matches('/'));
        let resp = self
            .client
            .request(Method::GET, &url)
            .header("Client-ID", self.session.client_id())
            .header("Authorization", format!("Bearer {}", self.session.token()))
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let message = resp
                .json::<HelixErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_default();
            let message = if message.is_empty() {
                format!("GET {path} failed")
            } else {
                message
            };
            return Err(TwitchTuiError::api(status.as_u16(), message));
        }

        let body = resp.bytes().await?;
        let data: ResponseData<T> = serde_json::from_slice(&body)?;
        debug!(path, items = data.data.len(), "helix response");
        Ok(data)
    }
}

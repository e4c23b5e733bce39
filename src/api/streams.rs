use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::client::HelixClient;
use crate::error::TwitchTuiError;

/// Page size for the followed-streams request.
pub const FOLLOWED_STREAMS_PAGE_SIZE: &str = "40";

/// A live stream as returned by `streams/followed`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    #[serde(rename = "user_name")]
    pub user_display_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(rename = "type", default)]
    pub stream_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub viewer_count: u64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub is_mature: bool,
    pub started_at: Option<DateTime<Utc>>,
}

impl HelixClient {
    /// Live channels the session's user follows.
    pub async fn followed_streams(&self) -> Result<Vec<Stream>, TwitchTuiError> {
        let user_id = self.session().user_id().to_string();
        let page = self
            .get_list::<Stream>(
                "streams/followed",
                &[("user_id", &user_id), ("first", FOLLOWED_STREAMS_PAGE_SIZE)],
            )
            .await?;
        Ok(page.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_deserializes_helix_payload() {
        let stream: Stream = serde_json::from_str(
            r#"{
                "id": "42",
                "user_id": "7",
                "user_login": "nerd99",
                "user_name": "Nerd99",
                "game_id": "509658",
                "game_name": "Just Chatting",
                "type": "live",
                "title": "hello",
                "tags": ["English"],
                "viewer_count": 1234,
                "language": "en",
                "thumbnail_url": "https://example/{width}x{height}.jpg",
                "is_mature": false,
                "started_at": "2024-01-01T12:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(stream.user_display_name, "Nerd99");
        assert_eq!(stream.stream_type, "live");
        assert_eq!(stream.viewer_count, 1234);
        assert!(stream.started_at.is_some());
    }

    #[test]
    fn stream_tolerates_null_tags_being_absent() {
        let stream: Stream = serde_json::from_str(
            r#"{"id":"1","user_id":"2","user_login":"a","user_name":"A","started_at":null}"#,
        )
        .unwrap();
        assert!(stream.tags.is_empty());
        assert!(stream.started_at.is_none());
    }
}

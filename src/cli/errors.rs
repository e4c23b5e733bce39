//! CLI-specific error formatting for user-facing messages.

use crate::auth::AuthError;
use crate::error::{ErrorCategory, TwitchTuiError};

/// Map a [`TwitchTuiError`] to a user-facing help string with actionable guidance.
pub fn format_error_help(err: &TwitchTuiError) -> String {
    match err {
        TwitchTuiError::Configuration(msg) => {
            format!("Configuration error: {msg}. Set TWITCH_CLIENT_ID and TWITCH_CLIENT_SECRET in your environment or .env")
        }
        TwitchTuiError::Authentication(AuthError::Listener(msg)) => {
            format!("Could not run the local callback listener: {msg}. Is another twitchtui login running, or is TWITCHTUI_CALLBACK_PORT taken?")
        }
        TwitchTuiError::Authentication(AuthError::CallbackTimeout(_)) => {
            format!("{err}. Run: twitchtui login")
        }
        TwitchTuiError::Authentication(AuthError::InvalidToken) => {
            "Authentication failed: the token was rejected. Run: twitchtui login".to_string()
        }
        TwitchTuiError::Authentication(AuthError::Cancelled) => "Login cancelled.".to_string(),
        TwitchTuiError::Authentication(other) if !matches!(other, AuthError::Network(_)) => {
            format!("Authentication failed: {other}. Run: twitchtui login")
        }
        _ => match err.category() {
            ErrorCategory::Authentication => {
                format!("{err}. The session may have expired. Run: twitchtui login")
            }
            ErrorCategory::Network => {
                format!("{err}. Check your network connection and try again.")
            }
            ErrorCategory::Server => format!("{err}. Twitch is having trouble, try again later."),
            ErrorCategory::Chat => format!(
                "{err}. Unset TWITCHTUI_QUIT_ON_CHAT_FAILURE to return to the stream list instead."
            ),
            _ => err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatError;
    use std::time::Duration;

    #[test]
    fn configuration_error_names_the_variables() {
        let err = TwitchTuiError::Configuration("TWITCH_CLIENT_ID is not set".into());
        let help = format_error_help(&err);
        assert!(help.contains("TWITCH_CLIENT_SECRET"));
    }

    #[test]
    fn authentication_errors_include_login_hint() {
        let err = TwitchTuiError::from(AuthError::AccessDenied("user said no".into()));
        let help = format_error_help(&err);
        assert!(help.contains("twitchtui login"));
        assert!(help.contains("user said no"));

        let err = TwitchTuiError::from(AuthError::CallbackTimeout(Duration::from_secs(300)));
        assert!(format_error_help(&err).contains("twitchtui login"));
    }

    #[test]
    fn listener_error_mentions_port() {
        let err = TwitchTuiError::from(AuthError::Listener("address in use".into()));
        assert!(format_error_help(&err).contains("TWITCHTUI_CALLBACK_PORT"));
    }

    #[test]
    fn help_follows_error_category() {
        let err = TwitchTuiError::api(401, "invalid oauth token");
        assert!(format_error_help(&err).contains("session may have expired"));

        let err = TwitchTuiError::api(503, "unavailable");
        assert!(format_error_help(&err).contains("try again later"));

        let err = TwitchTuiError::from(AuthError::Network("connection reset".into()));
        let help = format_error_help(&err);
        assert!(help.contains("connection reset"));
        assert!(help.contains("network connection"));

        let err = TwitchTuiError::from(ChatError::Authentication("Login authentication failed".into()));
        assert!(format_error_help(&err).contains("TWITCHTUI_QUIT_ON_CHAT_FAILURE"));
    }

    #[test]
    fn other_error_falls_through_to_display() {
        let err = TwitchTuiError::Terminal("not a tty".into());
        assert!(format_error_help(&err).contains("not a tty"));
    }
}

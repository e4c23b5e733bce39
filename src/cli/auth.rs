//! CLI auth command handlers for login, status, and logout.

use std::sync::Arc;

use crate::auth::{AuthError, AuthNotice, AuthNotifier, AuthorizationManager, FileTokenStore};
use crate::config::TwitchTuiConfig;
use crate::error::TwitchTuiError;
use crate::util::SystemBrowser;

/// Manager wired to the token file, the system browser and console notices.
pub fn manager(config: &TwitchTuiConfig) -> AuthorizationManager {
    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
    AuthorizationManager::new(config, store, Arc::new(SystemBrowser)).with_notifier(console_notifier())
}

/// Prints authorization progress to stdout; runs before the UI takes over
/// the terminal.
pub fn console_notifier() -> AuthNotifier {
    Arc::new(|notice: &AuthNotice| match notice {
        AuthNotice::OpeningBrowser { url } => {
            println!("Opening your browser to authorize twitchtui:");
            println!("  {url}");
        }
        AuthNotice::BrowserLaunchFailed { url, error } => {
            println!("Could not open a browser ({error}). Visit this URL to continue:");
            println!("  {url}");
        }
        AuthNotice::WaitingForCallback { redirect_uri } => {
            println!("Waiting for the redirect to {redirect_uri} (Ctrl-C to cancel)...");
        }
        AuthNotice::CallbackReceived => println!("Authorization received, finishing login..."),
        AuthNotice::Authorized { login } => println!("Logged in as {login}."),
    })
}

/// Handle `twitchtui login`.
pub async fn handle_login(config: &TwitchTuiConfig) -> Result<(), TwitchTuiError> {
    manager(config).login().await?;
    Ok(())
}

/// Handle `twitchtui status`.
pub async fn handle_status(config: &TwitchTuiConfig) -> Result<(), TwitchTuiError> {
    let manager = manager(config);
    println!("Token file: {}", config.token_path.display());
    match manager.cached_session().await {
        Ok(Some(session)) => {
            println!("Logged in as {} (user id {})", session.login(), session.user_id());
            println!("Scopes: {}", session.scopes().join(" "));
            println!(
                "Expires: {}",
                session.expires_at().format("%Y-%m-%d %H:%M UTC")
            );
        }
        Ok(None) => println!("Not logged in. Run: twitchtui login"),
        Err(AuthError::Network(error)) => {
            println!("Could not reach the identity provider: {error}");
        }
        Err(error) => return Err(error.into()),
    }
    Ok(())
}

/// Handle `twitchtui logout`.
pub async fn handle_logout(config: &TwitchTuiConfig) -> Result<(), TwitchTuiError> {
    manager(config).logout()?;
    println!("Logged out.");
    Ok(())
}

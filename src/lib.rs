//! twitchtui: a terminal client for Twitch.
//!
//! Authenticates with the authorization-code flow (reusing a cached session
//! while it still validates), lists the live channels the user follows and
//! shows a channel's chat.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use twitchtui::prelude::*;
//!
//! # async fn example() -> twitchtui::error::Result<()> {
//! let config = TwitchTuiConfig::from_env()?;
//! let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
//! let manager = AuthorizationManager::new(&config, store, Arc::new(SystemBrowser));
//! let session = Arc::new(manager.authorize().await?);
//!
//! let helix = HelixClient::new(&config.api_url, Arc::clone(&session));
//! for stream in helix.followed_streams().await? {
//!     println!("{} is playing {}", stream.user_display_name, stream.game_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod prelude;
pub mod ui;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

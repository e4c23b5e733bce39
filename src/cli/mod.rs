//! CLI entry point for twitchtui.

pub mod auth;
pub mod errors;

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TwitchTuiConfig;
use crate::error::TwitchTuiError;

/// Followed live channels and their chat, in the terminal.
#[derive(Parser, Debug)]
#[command(name = "twitchtui", version, about = "Twitch in your terminal")]
pub struct Cli {
    /// Runs the UI when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Authorize in the browser, replacing any cached session
    Login,
    /// Validate the cached session and show who it belongs to
    Status,
    /// Delete the cached session
    Logout,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Sends `tracing` output to the log file; the UI owns the terminal.
pub fn init_tracing(config: &TwitchTuiConfig) -> Result<(), TwitchTuiError> {
    if let Some(parent) = config.log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    let filter = EnvFilter::try_new(&config.log_filter).map_err(|error| {
        TwitchTuiError::Configuration(format!(
            "invalid TWITCHTUI_LOG filter '{}': {error}",
            config.log_filter
        ))
    })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|error| TwitchTuiError::Configuration(format!("tracing init failed: {error}")))
}

//! twitchtui binary entry point.

use std::sync::Arc;

use twitchtui::api::HelixClient;
use twitchtui::chat::{ChatBridge, TwitchIrcTransport};
use twitchtui::cli::errors::format_error_help;
use twitchtui::cli::{init_tracing, Cli, Commands};
use twitchtui::config::TwitchTuiConfig;
use twitchtui::error::TwitchTuiError;
use twitchtui::ui::App;
use twitchtui::util::SystemBrowser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {}", format_error_help(&e));
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>) -> Result<(), TwitchTuiError> {
    let config = TwitchTuiConfig::from_env()?;
    init_tracing(&config)?;

    match command {
        Some(Commands::Login) => twitchtui::cli::auth::handle_login(&config).await,
        Some(Commands::Status) => twitchtui::cli::auth::handle_status(&config).await,
        Some(Commands::Logout) => twitchtui::cli::auth::handle_logout(&config).await,
        None => run_ui(&config).await,
    }
}

async fn run_ui(config: &TwitchTuiConfig) -> Result<(), TwitchTuiError> {
    let session = Arc::new(twitchtui::cli::auth::manager(config).authorize().await?);
    tracing::info!(login = %session.login(), "starting ui");

    let helix = HelixClient::new(&config.api_url, Arc::clone(&session));
    let transport = Arc::new(TwitchIrcTransport::new(config.chat_url.clone()));
    let bridge = ChatBridge::new(transport, &session);

    App::new(
        helix,
        bridge,
        Arc::new(SystemBrowser),
        config.quit_on_chat_failure,
    )
    .run()
    .await
}

//! ragchat - terminal client for a retrieval-augmented chat backend
//!
#![doc = "Main entry point for the ragchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ragchat::cli::{Cli, Commands};
use ragchat::commands;
use ragchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;
    tracing::debug!(base_url = %config.api.base_url, "Configuration loaded");

    // Execute command
    match cli.command {
        Commands::Chat { collapsed } => {
            tracing::info!("Starting interactive chat mode");
            // Moves `config` into the handler (match arms are exclusive)
            commands::chat::run_chat(config, collapsed).await?;
            Ok(())
        }
        Commands::List { json } => {
            commands::sessions::run_list(&config, json).await?;
            Ok(())
        }
        Commands::Show { id } => {
            commands::sessions::run_show(&config, &id).await?;
            Ok(())
        }
        Commands::Ask { question, session } => {
            commands::sessions::run_ask(&config, &question, session.as_deref()).await?;
            Ok(())
        }
        Commands::Delete { id } => {
            tracing::info!("Deleting session {}", id);
            commands::sessions::run_delete(&config, &id).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never mix with command output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "ragchat=debug" } else { "ragchat=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

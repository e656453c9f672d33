use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notesweep_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "notesweep")]
#[command(author, version, about = "Clean up old daily notes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Vault directory (overrides general.vault_dir for this invocation)
    #[arg(short = 'v', long = "vault", global = true)]
    vault: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean old notes now
    Clean {
        /// Folder to clean, relative to the vault
        #[arg(short = 'f', long)]
        folder: Option<String>,
        /// Minimum note age in days
        #[arg(short = 'd', long)]
        days: Option<u32>,
    },
    /// Background daemon that cleans notes once a day
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum DaemonAction {
    /// Start the background daemon
    Start,
    /// Stop the background daemon
    Stop,
    /// Check daemon status
    Status,
    /// Ask the running daemon to clean now
    Trigger,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,
    /// Change one setting and save it
    Set {
        /// Setting name, e.g. age_threshold_days
        key: String,
        /// New value
        value: String,
    },
    /// Print the settings file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command.unwrap_or(Commands::Clean { folder: None, days: None }) {
        // Settings commands work on the file as saved, without overrides
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Set { key, value } => commands::config::set(config, &key, &value),
            ConfigAction::Path => commands::config::path(),
        },
        Commands::Clean { folder, days } => {
            let mut config = with_vault(config, cli.vault);
            if folder.is_some() {
                config.cleanup.folder = folder;
            }
            if let Some(days) = days {
                config.cleanup.age_threshold_days = days;
            }
            commands::clean::run(Arc::new(config)).await
        }
        Commands::Daemon { action } => match action {
            DaemonAction::Start => {
                commands::daemon::start(Arc::new(with_vault(config, cli.vault))).await
            }
            DaemonAction::Stop => commands::daemon::stop().await,
            DaemonAction::Status => commands::daemon::status().await,
            DaemonAction::Trigger => commands::daemon::trigger().await,
        },
    }
}

fn with_vault(mut config: AppConfig, vault: Option<PathBuf>) -> AppConfig {
    if let Some(vault) = vault {
        config.general.vault_dir = vault;
    }
    config
}

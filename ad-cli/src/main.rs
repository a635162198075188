//! AllDebrid CLI - command-line interface for the AllDebrid service.
//!
//! Unlocks hoster links, resolves delayed stream links, manages magnets and
//! saved links, and runs the pin flow to obtain an API key.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use ad_core::config::AppConfig;
use ad_core::error::AdResult;
use ad_core::logging;
use ad_core::platform::Platform;

/// AllDebrid - debrid service client.
#[derive(Parser)]
#[command(
    name = "alldebrid",
    version,
    about = "AllDebrid command-line client",
    long_about = "A command-line client for the AllDebrid v4 API.\n\
                  Unlock hoster links, resolve stream links and manage magnets from the terminal."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// API key (overrides config and the ALLDEBRID_API_KEY variable).
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is reachable.
    Ping,
    /// Obtain an API key through the pin flow.
    Auth {
        /// Save the obtained key to the config file without asking.
        #[arg(long)]
        save: bool,
    },
    /// Show account details.
    User,
    /// Unlock a hoster link.
    Unlock {
        /// Link to unlock.
        link: String,
        /// Password of a protected link.
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Resolve links into direct stream URLs, waiting for delayed links.
    Stream {
        /// Links to resolve.
        #[arg(required = true)]
        links: Vec<String>,
        /// Maximum number of status polls per link.
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Seconds between two polls.
        #[arg(long)]
        retry_delay: Option<u64>,
        /// Polling budget per link, in seconds.
        #[arg(long)]
        max_delay: Option<u64>,
    },
    /// Manage magnets.
    Magnets {
        #[command(subcommand)]
        action: commands::magnets::MagnetsAction,
    },
    /// Manage saved links.
    Links {
        #[command(subcommand)]
        action: commands::links::LinksAction,
    },
    /// Recently unlocked links.
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
}

/// Load the config file (explicit path or default location), then apply
/// environment and command-line overrides.
fn load_config(path: Option<&PathBuf>, api_key: Option<String>) -> AdResult<(AppConfig, PathBuf)> {
    let (mut config, path) = match path {
        Some(p) => {
            let mut config = AppConfig::load_from_file(p)?;
            config.apply_env();
            (config, p.clone())
        }
        None => (AppConfig::load_default()?, AppConfig::default_config_path()?),
    };
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.api.api_key = key.trim().to_string();
    }
    Ok((config, path))
}

#[tokio::main]
async fn main() -> AdResult<()> {
    let cli = Cli::parse();

    // A .env file may provide ALLDEBRID_API_KEY
    dotenvy::dotenv().ok();

    let (config, config_path) = load_config(cli.config.as_ref(), cli.api_key.clone())?;

    let level_override = cli.verbose.then_some("debug");
    let _guard = logging::init_from_config(&config.logging, level_override)?;

    info!("AllDebrid CLI v{}", ad_core::constants::APP_VERSION);
    debug!("platform: {}, config: {}", Platform::current(), config_path.display());

    match cli.command {
        Commands::Ping => commands::ping::run(&config, cli.format).await,
        Commands::Auth { save } => {
            commands::auth::run(config, &config_path, save, cli.format).await
        }
        Commands::User => commands::user::run(&config, cli.format).await,
        Commands::Unlock { link, password } => {
            commands::unlock::run(&config, &link, password.as_deref(), cli.format).await
        }
        Commands::Stream { links, max_attempts, retry_delay, max_delay } => {
            let overrides = commands::stream::PolicyOverrides { max_attempts, retry_delay, max_delay };
            commands::stream::run(&config, &links, overrides, cli.format).await
        }
        Commands::Magnets { action } => {
            commands::magnets::run(&config, action, cli.format).await
        }
        Commands::Links { action } => {
            commands::links::run(&config, action, cli.format).await
        }
        Commands::History { action } => {
            commands::history::run(&config, action, cli.format).await
        }
    }
}

//! plugin-cache - Content-addressed unpack cache for plugin packages
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use plugin_cache::cli::{Cli, Commands};
use plugin_cache::config::schema::LogFormat;
use plugin_cache::config::{Config, ConfigManager};
use plugin_cache::error::CacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config file {}", config_manager.path().display());

    if let Some(root) = cli.root {
        config.cache.root = Some(root);
    }
    if let Some(app) = cli.app {
        config.cache.app_name = app;
    }

    match cli.command {
        Commands::Unpack(args) => plugin_cache::cli::commands::unpack(args, &config).await,
        Commands::Status(args) => plugin_cache::cli::commands::status(args, &config).await,
        Commands::List(args) => plugin_cache::cli::commands::list(args, &config).await,
        Commands::Gc(args) => plugin_cache::cli::commands::gc(args, &config).await,
        Commands::Clear(args) => plugin_cache::cli::commands::clear(args, &config).await,
        Commands::Config(args) => {
            plugin_cache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Install the tracing subscriber: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose {
        0 if config.general.verbose => "info",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::new(format!("plugin_cache={}", level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    match config.general.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

//! Guster CLI: touchpad swipe gestures mapped to shell commands.
//!
//! Usage:
//!   guster [--dry-run] [run]     Listen to libinput and run bound commands
//!   guster replay <FILE>         Feed a captured event log through the recognizer
//!   guster init [--force]        Write the default config file
//!   guster check                 Check system capabilities

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use guster_common::config::{config_file_path, AppConfig, LoadedConfig, LoggingConfig};
use guster_common::logging::init_logging;

mod commands;

#[derive(Parser)]
#[command(
    name = "guster",
    about = "Multi-finger touchpad swipes mapped to commands",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (default: $XDG_CONFIG_HOME/guster/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only print the commands that would run
    #[arg(short = 't', long = "dry-run", visible_alias = "test", global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for gestures and run their commands (default)
    Run,

    /// Replay a captured `libinput debug-events` log
    Replay {
        /// Path to the log file
        path: PathBuf,

        /// Actually run bound commands instead of printing them
        #[arg(long)]
        execute: bool,
    },

    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config_file_path);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let loaded = load_config(&config_path, cli.verbose)?;
            commands::run::run(loaded.config, cli.dry_run).await
        }
        Commands::Replay { path, execute } => {
            let loaded = load_config(&config_path, cli.verbose)?;
            commands::replay::run(loaded.config, path, execute && !cli.dry_run).await
        }
        Commands::Init { force } => {
            init_logging(&LoggingConfig::default(), cli.verbose);
            commands::init::run(&config_path, force)
        }
        Commands::Check => {
            let loaded = load_config(&config_path, cli.verbose)?;
            commands::check::run(&loaded)
        }
    }
}

/// Load (or create) the config and initialize logging from it.
fn load_config(path: &Path, verbose: bool) -> anyhow::Result<LoadedConfig> {
    let loaded = AppConfig::load_or_create(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    init_logging(&loaded.config.logging, verbose);

    if loaded.created {
        tracing::info!(
            path = %loaded.path.display(),
            "Created default config. Edit it to customize gestures."
        );
    }
    Ok(loaded)
}

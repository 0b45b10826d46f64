//! # meetbridge
//!
//! Hosts the meetbridge port bridge for a UI process.
//!
//! ## Commands
//!
//! - `serve`: read outbound port messages as JSON lines on stdin, write
//!   inbound port messages as JSON lines on stdout
//! - `check-config`: load and validate the configuration
//!
//! ## Example
//!
//! ```bash
//! # Against Firebase
//! meetbridge serve --config meetbridge.toml
//!
//! # Offline, with the [mock] seed data
//! echo '{"channel":"fetch-meetings"}' | meetbridge serve --mock
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod logging;

use commands::{check, serve};
use config::Config;

/// Hosts the meetbridge port bridge.
#[derive(Parser, Debug)]
#[command(name = "meetbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: meetbridge.toml in the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the in-memory backend seeded from the [mock] section
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bridge over stdin/stdout
    Serve,

    /// Load and validate the configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Serve => serve::run(config, cli.mock).await?,
        Commands::CheckConfig => check::run(&config, cli.mock)?,
    }

    Ok(())
}

/// Load the explicit config file, else the default one if present.
fn load_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        return Ok(Config::from_file(&path)?);
    }

    let path = default_config_path()?;
    if path.exists() {
        tracing::info!(path = %path.display(), "Loading config");
        return Ok(Config::from_file(&path)?);
    }

    tracing::info!(path = %path.display(), "No config file, using defaults");
    Ok(Config::default())
}

/// Get the default config file path for meetbridge.
fn default_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "meetbridge")
        .context("Could not determine home directory")?;
    Ok(dirs.config_dir().join("meetbridge.toml"))
}

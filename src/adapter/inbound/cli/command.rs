//! Command-line interface definitions.
//!
//! `run` is the container entrypoint. The other subcommands prepare storage,
//! take a one-off backup or check that the bot is ready to start.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Telegram bot that tracks job interviews and sends reminders
#[derive(Parser, Debug)]
#[command(name = "interview-bot")]
#[command(version, about)]
pub struct Cli {
    /// Path to the configuration file (optional, defaults apply when missing)
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bot, the scheduler and the health server (foreground)
    Run(RunArgs),

    /// Write a config file and prepare the database and directories
    Init(InitArgs),

    /// Take a database backup now
    Backup,

    /// Check configuration, storage and database connectivity
    Check,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Skip the startup summary
    #[arg(long)]
    pub no_banner: bool,

    /// Do not start the health server even if enabled in config
    #[arg(long)]
    pub no_web: bool,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug, Default)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,

    /// Only prepare storage, do not write a config file
    #[arg(long)]
    pub no_config: bool,
}

//! CLI module graph and dispatch.

pub mod backup;
pub mod check;
pub mod command;
pub mod init;
pub mod output;
pub mod run;

use self::command::{Cli, Commands};
use self::output::OutputConfig;
use crate::error::Result;

/// Execute a parsed command line.
///
/// # Errors
/// Returns the first error of the selected subcommand.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Run(args) => run::execute(&cli.config, &args).await,
        Commands::Init(args) => init::execute(&cli.config, &args),
        Commands::Backup => backup::execute(&cli.config).await,
        Commands::Check => check::execute(&cli.config).await,
    }
}

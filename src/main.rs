use clap::Parser;
use interview_bot::adapter::inbound::cli::{self, command::Cli, output};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}

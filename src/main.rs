use ai_provider_bridge::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Models(args) => cli::models::run(args).await,
        Command::Ping(args) => cli::ping::run(args).await,
        Command::Chat(args) => cli::chat::run(args).await,
    }
}

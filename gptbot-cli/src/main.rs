//! gptbot CLI: run the Telegram bot, inspect or clear stored history.

use anyhow::{Context, Result};
use clap::Parser;
use gptbot_cli::config::database_url_from_env;
use gptbot_cli::maintenance::{clear_history, print_history};
use gptbot_cli::{run_bot, BotConfig, Cli, Commands};
use storage::HistoryRepository;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = BotConfig::load(token)?;
            run_bot(config).await
        }
        Commands::History { user_id, limit } => {
            let store = open_history().await?;
            print_history(&store, user_id, limit, &mut std::io::stdout()).await?;
            Ok(())
        }
        Commands::ClearHistory { user_id } => {
            let store = open_history().await?;
            clear_history(&store, user_id, &mut std::io::stdout()).await?;
            Ok(())
        }
    }
}

async fn open_history() -> Result<HistoryRepository> {
    let database_url = database_url_from_env();
    HistoryRepository::new(&database_url)
        .await
        .with_context(|| format!("Failed to open history database {}", database_url))
}

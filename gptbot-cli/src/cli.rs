//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gptbot")]
#[command(about = "Telegram chat bot relaying LLM replies: run, history, clear-history", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Print a user's stored conversation (DATABASE_URL from env).
    History {
        #[arg(short, long)]
        user_id: i64,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Delete a user's stored conversation.
    ClearHistory {
        #[arg(short, long)]
        user_id: i64,
    },
}

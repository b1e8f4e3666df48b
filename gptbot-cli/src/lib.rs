//! # gptbot-cli
//!
//! Binary support: argument parsing, configuration, component assembly and the offline history
//! commands.

pub mod app;
pub mod cli;
pub mod config;
pub mod maintenance;

pub use app::run_bot;
pub use cli::{Cli, Commands};
pub use config::BotConfig;

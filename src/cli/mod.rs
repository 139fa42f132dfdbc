//! CLI module for the AI provider bridge
//!
//! Provides subcommands that exercise a configured provider:
//! - `models`: list active models
//! - `ping`: check reachability and credentials
//! - `chat`: stream a reply to stdout

pub mod chat;
pub mod models;
pub mod ping;

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::{AiProvider, ConnectionContext, ProviderName};
use crate::infrastructure::llm::ProviderRegistry;
use crate::infrastructure::logging;

/// AI provider bridge - one streaming contract over many chat backends
#[derive(Parser)]
#[command(name = "ai-bridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the models a provider currently serves
    Models(ProviderArgs),

    /// Check a provider is reachable with the configured credentials
    Ping(ProviderArgs),

    /// Stream a chat reply to stdout
    Chat(chat::ChatArgs),
}

/// Provider selection shared by every command
#[derive(Args, Clone, Debug)]
pub struct ProviderArgs {
    /// Provider to use (groq, open_ai_compatible)
    #[arg(long, default_value = "groq")]
    pub provider: ProviderName,

    /// API key (overrides config)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

/// Load configuration, start logging, and build the selected provider.
pub(crate) fn bootstrap(args: &ProviderArgs) -> anyhow::Result<Arc<dyn AiProvider>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging)?;

    let connection = resolve_connection(&config, args);
    let registry = ProviderRegistry::with_defaults();

    registry
        .create(&connection)
        .with_context(|| format!("failed to create provider '{}'", args.provider))
}

fn resolve_connection(config: &AppConfig, args: &ProviderArgs) -> ConnectionContext {
    let mut connection = config
        .provider(args.provider)
        .cloned()
        .unwrap_or_else(|| ConnectionContext::new(args.provider, ""));

    if let Some(api_key) = &args.api_key {
        connection.api_key = api_key.clone();
    }
    if let Some(host) = &args.host {
        connection.host = host.clone();
    }

    connection
}

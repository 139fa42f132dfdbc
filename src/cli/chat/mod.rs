//! Chat command - streams a reply to stdout

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tokio::io::AsyncWriteExt;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{ProviderArgs, bootstrap};
use crate::domain::llm::cancel_after;
use crate::domain::{AiProvider, ChatOptions, Conversation, Model, StreamFormat, ToolDefinition};

/// Arguments for the chat command
#[derive(Args, Clone, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Model identifier as reported by `models`
    #[arg(long)]
    pub model: String,

    /// JSON file holding earlier turns: [{"role": "user", "text": "..."}]
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Tool offered to the model, as NAME=DESCRIPTION (repeatable)
    #[arg(long = "tool", value_parser = parse_tool)]
    pub tools: Vec<ToolDefinition>,

    /// raw: backend bytes as received; text: assistant text only
    #[arg(long, default_value = "raw")]
    pub format: StreamFormat,

    /// Abort the generation after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Message sent as the final user turn
    pub message: String,
}

fn parse_tool(raw: &str) -> Result<ToolDefinition, String> {
    let (name, description) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=DESCRIPTION, got '{}'", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err("tool name must not be empty".to_string());
    }

    Ok(ToolDefinition::new(name, description.trim()))
}

/// Run the chat command
pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    let provider = bootstrap(&args.provider)?;

    let mut conversations = load_history(args.history.as_ref()).await?;
    conversations.push(Conversation::user(args.message.as_str()));

    let options = ChatOptions::new()
        .tools(args.tools.clone())
        .stream_format(args.format);
    let model = Model::new(args.model.as_str(), provider.name());

    let root = CancellationToken::new();
    let cancel = match args.timeout_secs {
        Some(secs) => cancel_after(&root, Duration::from_secs(secs)),
        None => root.clone(),
    };

    let interrupt = root.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.cancelled() => {}
            result = signal::ctrl_c() => {
                if result.is_ok() {
                    interrupt.cancel();
                }
            }
        }
    });

    let result = stream_reply(provider.as_ref(), &cancel, &model, &conversations, &options).await;
    // Stops the deadline timer and the Ctrl-C listener
    root.cancel();
    result
}

async fn stream_reply(
    provider: &dyn AiProvider,
    cancel: &CancellationToken,
    model: &Model,
    conversations: &[Conversation],
    options: &ChatOptions,
) -> anyhow::Result<()> {
    let mut stream = provider.chat_stream(cancel, model, conversations, options)?;
    info!(stream_id = %stream.id(), model = %model.name, "Streaming reply");

    let mut stdout = tokio::io::stdout();
    loop {
        match stream.receive(cancel).await {
            Ok(Some(chunk)) => {
                stdout.write_all(&chunk).await?;
                stdout.flush().await?;
            }
            Ok(None) => break,
            Err(e) if e.is_cancelled() => {
                warn!("Chat stream cancelled");
                return Err(e.into());
            }
            Err(e) => return Err(e).context("chat stream failed"),
        }
    }

    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

async fn load_history(path: Option<&PathBuf>) -> anyhow::Result<Vec<Conversation>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read history file {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("invalid history file {}", path.display()))
}

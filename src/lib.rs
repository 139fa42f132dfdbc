//! AI Provider Bridge
//!
//! One streaming chat contract over interchangeable chat-completions
//! backends:
//! - `AiProvider` with `chat_stream`, `models` and `ping`
//! - A bounded byte bridge between the generation task and the reader
//! - Tool schema and conversation translation into the backend format
//! - A registry mapping provider names to constructors

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    AiProvider, ChatOptions, ChatStream, ConnectionContext, Conversation, ConversationRole,
    DomainError, Model, ProviderName, StreamFormat, ToolDefinition,
};
pub use infrastructure::llm::{HttpClient, OpenAiCompatibleProvider, ProviderRegistry};

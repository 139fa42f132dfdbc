//! Domain layer - Core types and contracts

pub mod error;
pub mod llm;

pub use error::DomainError;
pub use llm::{
    AiProvider, ChatOptions, ChatStream, ConnectionContext, Conversation, ConversationRole, Model,
    ProviderName, StreamFormat, ToolDefinition,
};

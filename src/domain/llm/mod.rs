//! AI provider domain models and traits

mod bridge;
mod connection;
mod conversation;
mod model;
mod options;
mod provider;

pub use bridge::{BRIDGE_CAPACITY, BridgeWriter, ChunkStream, ChatStream, RECEIVE_CHUNK_SIZE, bridge};
pub use connection::ConnectionContext;
pub use conversation::{Conversation, ConversationRole};
pub use model::{Model, ProviderName};
pub use options::{ChatOptions, StreamFormat, ToolDefinition};
pub use provider::{AiProvider, cancel_after};

#[cfg(test)]
pub use provider::mock::MockAiProvider;

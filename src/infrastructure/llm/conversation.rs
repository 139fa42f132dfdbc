use serde::Serialize;
use tracing::debug;

use crate::domain::{Conversation, ConversationRole};

/// Message as sent to a chat-completions backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant",
            content: content.into(),
        }
    }
}

/// Map the history into backend messages, keeping chronological order.
///
/// Turns with an unknown role are left out without a placeholder.
pub fn convert_conversations(conversations: &[Conversation]) -> Vec<ChatMessage> {
    conversations
        .iter()
        .filter_map(|conversation| match conversation.role {
            ConversationRole::User => Some(ChatMessage::user(conversation.text.as_str())),
            ConversationRole::Assistant => {
                Some(ChatMessage::assistant(conversation.text.as_str()))
            }
            ConversationRole::Unknown => {
                debug!("Skipping conversation turn with unknown role");
                None
            }
        })
        .collect()
}

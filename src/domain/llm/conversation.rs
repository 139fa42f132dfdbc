use serde::{Deserialize, Serialize};

/// Role of a turn in the conversation history
///
/// Histories are stored outside this crate and may carry roles the bridge does
/// not understand; those land in `Unknown` instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    User,
    #[serde(alias = "ai")]
    Assistant,
    #[serde(other)]
    Unknown,
}

/// One chronological turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub role: ConversationRole,
    pub text: String,
}

impl Conversation {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::Assistant,
            text: text.into(),
        }
    }
}

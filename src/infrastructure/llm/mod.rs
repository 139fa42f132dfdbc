//! AI provider implementations

mod conversation;
mod http_client;
mod openai_compatible;
mod registry;
mod sse;
mod tools;

pub use conversation::{ChatMessage, convert_conversations};
pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use openai_compatible::{GROQ_BASE_URL, OpenAiCompatibleProvider};
pub use registry::{ProviderConstructor, ProviderRegistry};
pub use sse::SseTextDecoder;
pub use tools::{RATIONALE_PARAM, SUGGESTIONS_PARAM, convert_tools};

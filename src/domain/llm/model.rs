use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Backends known to the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderName {
    Groq,
    OpenAiCompatible,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAiCompatible => "open_ai_compatible",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "open_ai_compatible" | "openai_compatible" | "openai-compatible" => {
                Ok(Self::OpenAiCompatible)
            }
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// A model a provider can generate with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub provider: ProviderName,
}

impl Model {
    pub fn new(name: impl Into<String>, provider: ProviderName) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }
}

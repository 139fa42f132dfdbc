use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A callable action offered to the model
///
/// Carries no argument schema; the backend schema is derived when a request is
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// What the generation task writes into the stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    /// Backend response bytes, untouched
    #[default]
    Raw,
    /// Assistant content deltas only
    Text,
}

impl FromStr for StreamFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown stream format '{}'", other)),
        }
    }
}

/// Per-call chat options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatOptions {
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    #[serde(default)]
    pub stream_format: StreamFormat,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn stream_format(mut self, format: StreamFormat) -> Self {
        self.stream_format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ChatOptions::new()
            .tool(ToolDefinition::new("search", "Search the web"))
            .tool(ToolDefinition::new("open", "Open a file"))
            .stream_format(StreamFormat::Text);

        assert_eq!(options.tools.len(), 2);
        assert_eq!(options.tools[0].name, "search");
        assert_eq!(options.stream_format, StreamFormat::Text);
    }

    #[test]
    fn test_options_default_is_raw_without_tools() {
        let options: ChatOptions = serde_json::from_str("{}").unwrap();
        assert!(options.tools.is_empty());
        assert_eq!(options.stream_format, StreamFormat::Raw);
    }
}

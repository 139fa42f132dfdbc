//! Function-calling schema for chat-completions backends
//!
//! Every tool gets the same parameter schema: a required `rationale` string
//! and a required `suggestions` array. Callers read both from each tool call,
//! so no tool-specific argument schema is accepted here.

use serde_json::{Value, json};

use crate::domain::ToolDefinition;

pub const RATIONALE_PARAM: &str = "rationale";
pub const SUGGESTIONS_PARAM: &str = "suggestions";

const RATIONALE_DESCRIPTION: &str =
    "The rationale for choosing this function call with these parameters";
const SUGGESTION_DESCRIPTION: &str = "A suggested prompt";

/// Convert abstract tool definitions into `tools` entries, preserving order.
pub fn convert_tools(tools: &[ToolDefinition]) -> Vec<Value> {
    tools.iter().map(convert_tool).collect()
}

fn convert_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": {
                "type": "object",
                "properties": {
                    RATIONALE_PARAM: {
                        "type": "string",
                        "description": RATIONALE_DESCRIPTION,
                    },
                    SUGGESTIONS_PARAM: {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "description": SUGGESTION_DESCRIPTION,
                        },
                        "description": SUGGESTION_DESCRIPTION,
                    },
                },
                "required": [RATIONALE_PARAM, SUGGESTIONS_PARAM],
            },
        },
    })
}

//! Reasoning-model response types.
//!
//! A model answers a conversation with a sequence of content blocks mixing
//! text and function-call intents. The adapter loop treats a response with
//! no tool-call intent as terminal.

use crate::tool::entities::{Arguments, ToolCallRequest};
use serde::{Deserialize, Serialize};

/// A single block of content within a model response.
///
/// # Examples
///
/// ```
/// use toolwire_domain::session::response::ContentBlock;
///
/// let text = ContentBlock::Text("Let me look that up.".to_string());
/// assert!(text.as_text().is_some());
///
/// let call = ContentBlock::ToolCall {
///     name: "top_n_products".to_string(),
///     arguments: serde_json::json!({"n": 5}).as_object().cloned().unwrap(),
/// };
/// assert!(call.as_tool_call().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    /// A text content block from the model.
    Text(String),

    /// A function-call intent from the model.
    ToolCall { name: String, arguments: Arguments },
}

impl ContentBlock {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tool_call(&self) -> Option<(&str, &Arguments)> {
        match self {
            ContentBlock::ToolCall { name, arguments } => Some((name, arguments)),
            _ => None,
        }
    }
}

/// A structured response from a reasoning model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    /// Content blocks in the response (text and/or tool-call intents).
    pub content: Vec<ContentBlock>,
    /// Model identifier (if returned by the API).
    pub model: Option<String>,
}

impl ModelResponse {
    /// Create a text-only response.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
            model: None,
        }
    }

    /// Create a response carrying a single tool-call intent.
    pub fn tool_call(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            content: vec![ContentBlock::ToolCall {
                name: name.into(),
                arguments,
            }],
            model: None,
        }
    }

    /// Concatenate all `Text` content blocks into a single string.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.as_text())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all tool-call intents in order.
    pub fn tool_calls(&self) -> Vec<ToolCallRequest> {
        self.content
            .iter()
            .filter_map(|b| b.as_tool_call())
            .map(|(name, arguments)| ToolCallRequest::new(name).with_arguments(arguments.clone()))
            .collect()
    }

    pub fn has_tool_calls(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolCall { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_text_creates_text_only_response() {
        let response = ModelResponse::from_text("Hello!");
        assert_eq!(response.text_content(), "Hello!");
        assert!(!response.has_tool_calls());
        assert!(response.tool_calls().is_empty());
    }

    #[test]
    fn mixed_response_extracts_calls_in_order() {
        let response = ModelResponse {
            content: vec![
                ContentBlock::Text("Checking. ".to_string()),
                ContentBlock::ToolCall {
                    name: "top_n_products".to_string(),
                    arguments: json!({"n": 3}).as_object().cloned().unwrap(),
                },
                ContentBlock::ToolCall {
                    name: "forecast_sales".to_string(),
                    arguments: Arguments::new(),
                },
            ],
            model: Some("gemini-2.5-flash".to_string()),
        };

        assert!(response.has_tool_calls());
        let calls = response.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tool_name, "top_n_products");
        assert_eq!(calls[0].get_i64("n"), Some(3));
        assert_eq!(calls[1].tool_name, "forecast_sales");
        assert_eq!(response.text_content(), "Checking. ");
    }
}

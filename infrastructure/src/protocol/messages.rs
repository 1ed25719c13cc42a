//! Method payloads for the tool protocol.
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `initialize` | [`InitializeParams`] | [`InitializeResult`] |
//! | `notifications/initialized` | none | (notification) |
//! | `tools/list` | `{}` | [`ListToolsResult`] |
//! | `tools/call` | [`CallToolParams`] | [`CallToolResult`] |
//! | `ping` | none | `{}` |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolwire_domain::{Arguments, ToolCallResult, ToolDescriptor};

/// Protocol revision spoken by this implementation.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Method names
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const LIST_TOOLS: &str = "tools/list";
    pub const CALL_TOOL: &str = "tools/call";
    pub const PING: &str = "ping";
}

/// Name and version of a peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

impl Implementation {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// `initialize` params (client → host)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: Implementation,
}

impl InitializeParams {
    pub fn new(client_info: Implementation) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: serde_json::json!({}),
            client_info,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    #[serde(default)]
    pub list_changed: bool,
}

/// Capability set advertised by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default)]
    pub tools: Option<ToolsCapability>,
}

/// `initialize` result (host → client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// `tools/list` result, in registration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDescriptor>,
}

/// `tools/call` params
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl CallToolParams {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments: Some(Value::Object(arguments)),
        }
    }

    /// Arguments as a map. Absent or `null` means empty; anything other than
    /// an object is a protocol error.
    pub fn arguments_map(&self) -> Result<Arguments, String> {
        match &self.arguments {
            None | Some(Value::Null) => Ok(Arguments::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(format!(
                "tools/call arguments must be an object, got {}",
                json_type_name(other)
            )),
        }
    }
}

/// A content item in a `tools/call` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text {
        text: String,
    },
    /// Image, audio, resource... kept only so foreign hosts parse.
    #[serde(other)]
    Unsupported,
}

/// `tools/call` result on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl CallToolResult {
    fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                ContentItem::Text { text } => Some(text.as_str()),
                ContentItem::Unsupported => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<&ToolCallResult> for CallToolResult {
    fn from(result: &ToolCallResult) -> Self {
        match result {
            ToolCallResult::Success(payload) => {
                let text = match payload {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                CallToolResult {
                    content: vec![ContentItem::Text { text }],
                    is_error: false,
                    structured_content: Some(payload.clone()),
                }
            }
            ToolCallResult::Failure(message) => CallToolResult {
                content: vec![ContentItem::Text {
                    text: message.clone(),
                }],
                is_error: true,
                structured_content: None,
            },
        }
    }
}

impl From<CallToolResult> for ToolCallResult {
    fn from(wire: CallToolResult) -> Self {
        if wire.is_error {
            return ToolCallResult::Failure(wire.joined_text());
        }
        match wire.structured_content {
            Some(payload) => ToolCallResult::Success(payload),
            None => ToolCallResult::Success(Value::String(wire.joined_text())),
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

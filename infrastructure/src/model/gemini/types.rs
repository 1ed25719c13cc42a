//! Conversions between the conversation model and the `generateContent` wire
//! format.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use toolwire_domain::{
    Arguments, ContentBlock, Conversation, ModelResponse, Role, ToolCallResult, TurnContent,
};

// ─── Request ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Arguments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    pub generation_config: Value,
}

impl GenerateContentRequest {
    pub fn new(conversation: &Conversation, functions: &[Value], temperature: f32) -> Self {
        let (system_instruction, contents) = convert_conversation(conversation);
        let tools = if functions.is_empty() {
            Vec::new()
        } else {
            vec![json!({ "functionDeclarations": functions })]
        };
        Self {
            contents,
            system_instruction,
            tools,
            generation_config: json!({ "temperature": temperature }),
        }
    }
}

/// Tool results go back as `functionResponse` parts; the payload must be an
/// object, so it is wrapped.
pub fn function_response(tool_name: &str, result: &ToolCallResult) -> FunctionResponse {
    let response = match result {
        ToolCallResult::Success(payload) => json!({ "result": payload }),
        ToolCallResult::Failure(message) => json!({ "error": message }),
    };
    FunctionResponse {
        name: tool_name.to_string(),
        response,
    }
}

/// Split system turns into `systemInstruction` and map the rest to
/// `contents`, merging adjacent turns that share a Gemini role.
pub fn convert_conversation(conversation: &Conversation) -> (Option<Content>, Vec<Content>) {
    let mut system = Vec::new();
    let mut contents: Vec<Content> = Vec::new();

    for turn in conversation.turns() {
        let (role, part) = match (&turn.role, &turn.content) {
            (Role::System, TurnContent::Text { text }) => {
                system.push(Part::text(text.clone()));
                continue;
            }
            (Role::Assistant, TurnContent::Text { text }) => ("model", Part::text(text.clone())),
            (_, TurnContent::Text { text }) => ("user", Part::text(text.clone())),
            (_, TurnContent::ToolCall { call }) => (
                "model",
                Part {
                    function_call: Some(FunctionCall {
                        name: call.tool_name.clone(),
                        args: call.arguments.clone(),
                    }),
                    ..Default::default()
                },
            ),
            (_, TurnContent::ToolResult { tool_name, result }) => (
                "user",
                Part {
                    function_response: Some(function_response(tool_name, result)),
                    ..Default::default()
                },
            ),
        };

        match contents.last_mut() {
            Some(last) if last.role.as_deref() == Some(role) => last.parts.push(part),
            _ => contents.push(Content {
                role: Some(role.to_string()),
                parts: vec![part],
            }),
        }
    }

    let system_instruction = (!system.is_empty()).then(|| Content {
        role: None,
        parts: system,
    });
    (system_instruction, contents)
}

// ─── Response ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// First candidate's parts as content blocks. `None` when the model
    /// returned no candidate at all.
    pub fn into_model_response(self) -> Option<ModelResponse> {
        let candidate = self.candidates.into_iter().next()?;
        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

        let content = parts
            .into_iter()
            .filter_map(|part| {
                if let Some(call) = part.function_call {
                    Some(ContentBlock::ToolCall {
                        name: call.name,
                        arguments: call.args,
                    })
                } else {
                    part.text.map(ContentBlock::Text)
                }
            })
            .collect();

        Some(ModelResponse {
            content,
            model: self.model_version,
        })
    }
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

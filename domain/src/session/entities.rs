//! Conversation entities for the function-calling adapter loop

use crate::tool::entities::ToolCallRequest;
use crate::tool::value_objects::ToolCallResult;
use serde::{Deserialize, Serialize};

/// Role of a turn in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Synthetic turn carrying a tool result back to the model
    Tool,
}

/// Content of a single turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnContent {
    Text { text: String },
    ToolCall { call: ToolCallRequest },
    ToolResult {
        tool_name: String,
        result: ToolCallResult,
    },
}

/// A single conversation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(flatten)]
    pub content: TurnContent,
}

impl Turn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn tool_call(call: ToolCallRequest) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::ToolCall { call },
        }
    }

    pub fn tool_result(tool_name: impl Into<String>, result: ToolCallResult) -> Self {
        Self {
            role: Role::Tool,
            content: TurnContent::ToolResult {
                tool_name: tool_name.into(),
                result,
            },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Ordered conversation history shared with the reasoning model.
///
/// Every tool-call intent must be followed by its result before the
/// conversation is handed back to the user; [`is_resolved`](Self::is_resolved)
/// checks that invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(prompt)],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of tool calls that have no result turn after them yet.
    pub fn pending_tool_calls(&self) -> usize {
        let mut pending: usize = 0;
        for turn in &self.turns {
            match turn.content {
                TurnContent::ToolCall { .. } => pending += 1,
                TurnContent::ToolResult { .. } => pending = pending.saturating_sub(1),
                TurnContent::Text { .. } => {}
            }
        }
        pending
    }

    pub fn is_resolved(&self) -> bool {
        self.pending_tool_calls() == 0
    }

    /// Drop everything except a leading system prompt.
    pub fn clear(&mut self) {
        self.turns.retain(|t| t.role == Role::System);
    }
}

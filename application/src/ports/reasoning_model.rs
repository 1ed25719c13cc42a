//! Reasoning model port
//!
//! Defines the interface for the function-calling model that drives the
//! adapter loop, and the [`FunctionDialect`] that translates published tool
//! descriptors into whatever declaration format that model expects.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use toolwire_domain::{Conversation, ModelResponse, ToolDescriptor};

/// Errors that can occur while asking the model for its next step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Sampling parameters forwarded with every model request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
}

/// Converts tool descriptors to a model's function-declaration format.
///
/// Separates "which tools exist" (the host's listing) from "how a given model
/// vendor wants them described".
pub trait FunctionDialect: Send + Sync {
    /// Convert a single descriptor to a function declaration.
    fn declare(&self, tool: &ToolDescriptor) -> Value;

    /// Convert every descriptor, preserving order.
    fn declare_all(&self, tools: &[ToolDescriptor]) -> Vec<Value> {
        tools.iter().map(|t| self.declare(t)).collect()
    }
}

/// Dialect that passes the descriptor through as plain JSON Schema
/// (`{name, description, parameters}`).
pub struct JsonSchemaDialect;

impl FunctionDialect for JsonSchemaDialect {
    fn declare(&self, tool: &ToolDescriptor) -> Value {
        serde_json::json!({
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema.to_json_schema(),
        })
    }
}

/// A function-calling reasoning model
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    /// Display name of the model (for logs and progress output).
    fn name(&self) -> &str;

    /// The declaration format this model understands.
    fn dialect(&self) -> &dyn FunctionDialect;

    /// Produce the next response for `conversation`, given the declared
    /// functions. A response without tool-call intents ends the loop.
    async fn generate(
        &self,
        conversation: &Conversation,
        functions: &[Value],
        params: GenerationParams,
    ) -> Result<ModelResponse, ModelError>;
}

//! Application layer for toolwire
//!
//! This crate contains the adapter-loop use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::AdapterParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{AdapterProgressNotifier, NoAdapterProgress},
    reasoning_model::{FunctionDialect, GenerationParams, JsonSchemaDialect, ModelError, ReasoningModel},
    tool_client::{ToolClientError, ToolClientPort},
};
pub use use_cases::run_adapter_loop::{
    AdapterOutcome, RunAdapterError, RunAdapterLoopUseCase, RunAdapterOutput, ToolCallRecord,
};

//! Domain layer for toolwire
//!
//! This crate contains the core entities and pure logic of the tool
//! invocation protocol. It has no dependencies on I/O, transports, or any
//! particular reasoning model.
//!
//! # Core Concepts
//!
//! - **Tool**: a named, schema-described capability a host exposes
//! - **Session**: one live connection between a caller and a tool host,
//!   tracked by an explicit state machine on each side
//! - **Conversation**: the running history the adapter loop shares with a
//!   reasoning model, including tool-call intents and their results

pub mod core;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use crate::core::error::DomainError;
pub use session::{
    entities::{Conversation, Role, Turn, TurnContent},
    response::{ContentBlock, ModelResponse},
    state::{HostState, SessionState},
};
pub use tool::{
    entities::{
        Arguments, InputSchema, ParamConstraints, ParamType, ToolCallRequest, ToolDescriptor,
        ToolParameter,
    },
    executor::{FnExecutor, ToolExecutor},
    traits::{DefaultToolValidator, ToolValidator, UnknownFieldPolicy},
    value_objects::{ExecutionError, ToolCallResult, ValidationError},
};

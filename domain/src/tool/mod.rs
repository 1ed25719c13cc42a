//! Tool domain module
//!
//! This module defines the core abstractions for **tools**: named,
//! schema-described capabilities that a host exposes for remote invocation.
//!
//! # Overview
//!
//! ```text
//! ┌────────────────┐    ┌─────────────────┐    ┌────────────────┐
//! │ ToolDescriptor │───▶│ ToolCallRequest │───▶│ ToolCallResult │
//! │ (published)    │    │ (invocation)    │    │ (outcome)      │
//! └───────┬────────┘    └─────────────────┘    └────────────────┘
//!         │
//!         └─ inputSchema: ordered properties + required list
//! ```
//!
//! - [`ToolDescriptor`]: name, description and [`InputSchema`]; identity is the name
//! - [`ToolCallRequest`]: tool name plus an [`Arguments`] map
//! - [`ToolCallResult`]: `Success(payload)` or `Failure(message)`, never both
//! - [`ToolValidator`]: pure argument validation and coercion against a schema
//! - [`ToolExecutor`]: the execution seam for application-specific tool logic
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions and validation, no I/O
//! - **Application** (`ToolClientPort`): how the adapter loop reaches tools
//! - **Infrastructure** (`ToolRegistry`, `ToolHost`, `ToolClient`): dispatch
//!   and the wire protocol

pub mod entities;
pub mod executor;
pub mod traits;
pub mod value_objects;

pub use entities::{
    Arguments, InputSchema, ParamConstraints, ParamType, ToolCallRequest, ToolDescriptor,
    ToolParameter,
};
pub use executor::{FnExecutor, ToolExecutor};
pub use traits::{DefaultToolValidator, ToolValidator, UnknownFieldPolicy};
pub use value_objects::{ExecutionError, ToolCallResult, ValidationError};

//! Tool domain value objects: immutable result and error types
//!
//! Every dispatch produces exactly one [`ToolCallResult`]. Argument problems
//! ([`ValidationError`]) and executor failures ([`ExecutionError`]) are
//! converted into `Failure` results at the registry boundary, so they travel
//! back to the caller as data instead of tearing down the session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Outcome of a tool call: either a success payload or a failure message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolCallResult {
    /// The executor's payload, unchanged
    Success(Value),
    /// Human-readable failure description
    Failure(String),
}

impl ToolCallResult {
    pub fn success(payload: impl Into<Value>) -> Self {
        ToolCallResult::Success(payload.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ToolCallResult::Failure(message.into())
    }

    /// Failure result for a name that is not in the registry
    pub fn unknown_tool(name: &str) -> Self {
        ToolCallResult::Failure(format!("unknown tool: {}", name))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolCallResult::Success(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            ToolCallResult::Success(v) => Some(v),
            ToolCallResult::Failure(_) => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            ToolCallResult::Success(_) => None,
            ToolCallResult::Failure(m) => Some(m),
        }
    }

    /// Text rendering of the result, as shown to a model or a user.
    ///
    /// String payloads are returned verbatim; other payloads are rendered as
    /// pretty-printed JSON.
    pub fn to_text(&self) -> String {
        match self {
            ToolCallResult::Success(Value::String(s)) => s.clone(),
            ToolCallResult::Success(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
            ToolCallResult::Failure(m) => m.clone(),
        }
    }
}

impl fmt::Display for ToolCallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolCallResult::Success(_) => write!(f, "success: {}", self.to_text()),
            ToolCallResult::Failure(m) => write!(f, "failure: {}", m),
        }
    }
}

/// Error raised by a tool executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ExecutionError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ExecutionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for ExecutionError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("serialization failed: {}", e))
    }
}

/// Arguments that do not match a tool's input schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required argument '{param}'")]
    MissingRequired { param: String },

    #[error("invalid argument '{param}': expected {expected}, got {found}")]
    TypeMismatch {
        param: String,
        expected: String,
        found: String,
    },

    #[error("unknown argument '{param}'")]
    UnknownParameter { param: String },

    #[error("invalid argument '{param}': {value} is not one of {allowed}")]
    NotAllowed {
        param: String,
        value: String,
        allowed: String,
    },

    #[error("invalid argument '{param}': {value} is {relation} {bound}")]
    OutOfRange {
        param: String,
        value: String,
        relation: &'static str,
        bound: f64,
    },
}

impl ValidationError {
    /// Name of the offending parameter
    pub fn param(&self) -> &str {
        match self {
            ValidationError::MissingRequired { param }
            | ValidationError::TypeMismatch { param, .. }
            | ValidationError::UnknownParameter { param }
            | ValidationError::NotAllowed { param, .. }
            | ValidationError::OutOfRange { param, .. } => param,
        }
    }
}

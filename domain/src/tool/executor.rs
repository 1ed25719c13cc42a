//! Tool executor abstraction
//!
//! A [`ToolExecutor`] is the single place where application-specific tool
//! logic (analytics queries, forecasting, ...) plugs into the protocol core.
//! Executors receive arguments that were already validated and normalized
//! against the tool's [`InputSchema`](super::entities::InputSchema), and must
//! not share mutable state between calls.
//!
//! ```ignore
//! registry.register(
//!     ToolDescriptor::new("echo", "Echo text back")
//!         .with_parameter(ToolParameter::new("text", ParamType::String, true)),
//!     FnExecutor::new(|args| Ok(args["text"].clone())),
//! )?;
//! ```

use async_trait::async_trait;
use serde_json::Value;

use super::entities::Arguments;
use super::value_objects::ExecutionError;

/// Executes one tool against validated arguments
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run the tool, returning a JSON-serializable payload on success.
    async fn execute(&self, args: &Arguments) -> Result<Value, ExecutionError>;
}

/// Adapter turning a plain closure into a [`ToolExecutor`]
pub struct FnExecutor<F> {
    f: F,
}

impl<F> FnExecutor<F>
where
    F: Fn(&Arguments) -> Result<Value, ExecutionError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> ToolExecutor for FnExecutor<F>
where
    F: Fn(&Arguments) -> Result<Value, ExecutionError> + Send + Sync,
{
    async fn execute(&self, args: &Arguments) -> Result<Value, ExecutionError> {
        (self.f)(args)
    }
}

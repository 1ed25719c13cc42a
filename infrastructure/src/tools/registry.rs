//! Tool Registry
//!
//! The [`ToolRegistry`] maps tool names to a published [`ToolDescriptor`] and
//! the [`ToolExecutor`] that implements it, and dispatches calls.
//!
//! # Usage
//!
//! ```ignore
//! use toolwire_infrastructure::tools::{ToolRegistry, builtin};
//!
//! let mut registry = ToolRegistry::new();
//! builtin::register_builtin_tools(&mut registry)?;
//!
//! assert!(registry.contains("echo"));
//! let result = registry.dispatch("sum", &args).await;
//! ```
//!
//! # Dispatch
//!
//! 1. Look up the descriptor; a missing name yields `failure("unknown tool: <name>")`
//! 2. Validate arguments against the input schema (coercion + defaults)
//! 3. Run the executor on the normalized arguments
//! 4. Convert executor errors and panics into `failure(..)`
//!
//! Every outcome is a [`ToolCallResult`]; dispatch never fails the session.
//! Registration happens before serving begins, after which the registry is
//! only read, so a shared `Arc<ToolRegistry>` needs no locking.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use toolwire_domain::{
    Arguments, DefaultToolValidator, DomainError, ToolCallResult, ToolDescriptor, ToolExecutor,
    ToolValidator, UnknownFieldPolicy,
};
use tracing::{debug, warn};

struct RegisteredTool {
    descriptor: ToolDescriptor,
    executor: Arc<dyn ToolExecutor>,
}

/// Name → (descriptor, executor) table, in registration order
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
    validator: DefaultToolValidator,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            validator: DefaultToolValidator::default(),
        }
    }

    /// Choose how undeclared arguments are handled (default: reject).
    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.validator = DefaultToolValidator::new(policy);
        self
    }

    /// Register a tool.
    ///
    /// Fails on an invalid or duplicate name; the registry is unchanged in
    /// that case.
    pub fn register<E: ToolExecutor + 'static>(
        &mut self,
        descriptor: ToolDescriptor,
        executor: E,
    ) -> Result<(), DomainError> {
        self.register_arc(descriptor, Arc::new(executor))
    }

    /// Register a tool (Arc version)
    pub fn register_arc(
        &mut self,
        descriptor: ToolDescriptor,
        executor: Arc<dyn ToolExecutor>,
    ) -> Result<(), DomainError> {
        descriptor.validate_name()?;
        if self.index.contains_key(&descriptor.name) {
            return Err(DomainError::DuplicateTool(descriptor.name));
        }

        debug!(tool = %descriptor.name, "Registered tool");
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            executor,
        });
        Ok(())
    }

    /// All descriptors, in registration order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i].descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get statistics about registered tools
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_tools: self.tools.len(),
            required_params: self
                .tools
                .iter()
                .map(|t| t.descriptor.input_schema.required().count())
                .sum(),
        }
    }

    /// Validate and execute one call.
    pub async fn dispatch(&self, name: &str, args: &Arguments) -> ToolCallResult {
        let Some(tool) = self.index.get(name).map(|&i| &self.tools[i]) else {
            debug!(tool = %name, "Dispatch to unknown tool");
            return ToolCallResult::unknown_tool(name);
        };

        let normalized = match self.validator.validate(&tool.descriptor.input_schema, args) {
            Ok(normalized) => normalized,
            Err(e) => {
                debug!(tool = %name, error = %e, "Argument validation failed");
                return ToolCallResult::failure(e.to_string());
            }
        };

        let outcome = AssertUnwindSafe(tool.executor.execute(&normalized))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(payload)) => ToolCallResult::Success(payload),
            Ok(Err(e)) => {
                debug!(tool = %name, error = %e, "Tool execution failed");
                ToolCallResult::Failure(e.message)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(tool = %name, "Tool executor panicked: {}", message);
                ToolCallResult::Failure(message)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_tools: usize,
    pub required_params: usize,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool executor panicked".to_string()
    }
}

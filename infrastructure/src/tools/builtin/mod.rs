//! Built-in demo tools: echo, sum
//!
//! These are the only tools the bundled host registers. Anything
//! domain-specific (analytics queries, forecasting) plugs in through
//! [`ToolRegistry::register`](super::ToolRegistry::register) instead.

use serde_json::{Value, json};
use toolwire_domain::{
    Arguments, DomainError, ExecutionError, FnExecutor, ParamType, ToolDescriptor, ToolParameter,
};

use super::ToolRegistry;

/// Tool name constants
pub const ECHO: &str = "echo";
pub const SUM: &str = "sum";

/// Get the tool definition for echo
pub fn echo_definition() -> ToolDescriptor {
    ToolDescriptor::new(ECHO, "Echo the given text back unchanged").with_parameter(
        ToolParameter::new("text", ParamType::String, true).with_description("Text to echo"),
    )
}

/// Get the tool definition for sum
pub fn sum_definition() -> ToolDescriptor {
    ToolDescriptor::new(SUM, "Add two integers")
        .with_parameter(
            ToolParameter::new("a", ParamType::Integer, true).with_description("First addend"),
        )
        .with_parameter(
            ToolParameter::new("b", ParamType::Integer, true).with_description("Second addend"),
        )
}

/// Execute the echo tool
pub fn execute_echo(args: &Arguments) -> Result<Value, ExecutionError> {
    match args.get("text") {
        Some(Value::String(text)) => Ok(Value::String(text.clone())),
        _ => Err(ExecutionError::new("missing 'text' argument")),
    }
}

/// Execute the sum tool
pub fn execute_sum(args: &Arguments) -> Result<Value, ExecutionError> {
    let a = integer_arg(args, "a")?;
    let b = integer_arg(args, "b")?;
    a.checked_add(b)
        .map(|total| json!(total))
        .ok_or_else(|| ExecutionError::new(format!("integer overflow adding {} and {}", a, b)))
}

fn integer_arg(args: &Arguments, name: &str) -> Result<i64, ExecutionError> {
    match args.get(name) {
        None => Err(ExecutionError::new(format!("missing integer argument '{}'", name))),
        Some(value) => value.as_i64().ok_or_else(|| {
            ExecutionError::new(format!(
                "argument '{}' is not a 64-bit integer: {}",
                name, value
            ))
        }),
    }
}

/// Register echo and sum, in that order.
pub fn register_builtin_tools(registry: &mut ToolRegistry) -> Result<(), DomainError> {
    registry.register(echo_definition(), FnExecutor::new(execute_echo))?;
    registry.register(sum_definition(), FnExecutor::new(execute_sum))?;
    Ok(())
}

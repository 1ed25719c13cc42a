//! Progress notification port
//!
//! Callbacks fired by the adapter loop so the presentation layer can show
//! what the model is doing while a turn is in flight.

use toolwire_domain::{ToolCallRequest, ToolCallResult};

/// Progress updates during one adapter-loop turn
///
/// Every method has a no-op default; implementors override only what they
/// display.
pub trait AdapterProgressNotifier: Send + Sync {
    /// Called before each model request. `round` counts completed tool rounds.
    fn on_model_request(&self, _round: usize) {}

    /// Called before a tool call is sent to the host.
    fn on_tool_call(&self, _call: &ToolCallRequest) {}

    /// Called once the result (or narrated failure) of a tool call is known.
    fn on_tool_result(&self, _tool_name: &str, _result: &ToolCallResult) {}

    /// Called when the loop stops because the round limit was reached.
    fn on_limit_exceeded(&self, _max_rounds: usize) {}
}

/// No-op progress notifier
pub struct NoAdapterProgress;

impl AdapterProgressNotifier for NoAdapterProgress {}

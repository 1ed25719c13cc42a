//! Port for structured conversation logging.
//!
//! The adapter loop records every user turn, model response, tool call and
//! tool result through [`ConversationLogger`]. Human-readable diagnostics go
//! through `tracing`; this port captures the transcript in a machine-readable
//! form (one JSON object per line in the file-backed implementation).

use serde_json::Value;

/// A structured conversation event.
pub struct ConversationEvent {
    /// Event type identifier (e.g. "user_message", "tool_call", "tool_result").
    pub event_type: &'static str,
    /// Event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for conversation events.
///
/// `log` is synchronous and infallible. Implementations report their own
/// write failures through `tracing` and carry on.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op logger for tests and when transcript logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

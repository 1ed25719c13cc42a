//! Tool client port
//!
//! Defines how the adapter loop reaches a tool host. The concrete session
//! (child process, TCP, in-memory pipe) lives in the infrastructure layer.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use toolwire_domain::{ToolCallRequest, ToolCallResult, ToolDescriptor};

/// Errors a tool client can report instead of a [`ToolCallResult`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolClientError {
    #[error("not connected to a tool host")]
    NotConnected,

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool call timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection to tool host lost: {0}")]
    ConnectionLost(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Client-side view of a connected tool host
#[async_trait]
pub trait ToolClientPort: Send + Sync {
    /// Tool descriptors cached from the last successful listing, in host order.
    fn tools(&self) -> Vec<ToolDescriptor>;

    /// Invoke one tool on the host.
    ///
    /// Tool-level failures (validation, executor errors) come back as
    /// `Ok(ToolCallResult::Failure(..))`. `Err` is reserved for the session
    /// itself failing.
    async fn call_tool(&self, request: &ToolCallRequest)
    -> Result<ToolCallResult, ToolClientError>;

    /// Check that the host still answers. Clients without a liveness
    /// request report success.
    async fn ping(&self) -> Result<(), ToolClientError> {
        Ok(())
    }
}

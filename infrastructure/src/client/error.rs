//! Error types for the tool client

use std::time::Duration;
use thiserror::Error;
use toolwire_application::ToolClientError;

use crate::transport::TransportError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to a tool host
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not connected to a tool host")]
    NotConnected,

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(TransportError),

    #[error("Failed to start tool host: {0}")]
    Spawn(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl ClientError {
    /// Whether this error leaves the session unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionLost(_) | ClientError::Timeout(_) | ClientError::Transport(_)
        )
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Spawn { .. } => ClientError::Spawn(err.to_string()),
            other => ClientError::Transport(other),
        }
    }
}

impl From<ClientError> for ToolClientError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotConnected => ToolClientError::NotConnected,
            ClientError::UnknownTool(name) => ToolClientError::UnknownTool(name),
            ClientError::Timeout(d) => ToolClientError::Timeout(d),
            ClientError::ConnectionLost(msg) => ToolClientError::ConnectionLost(msg),
            e @ (ClientError::Transport(_) | ClientError::Spawn(_)) => {
                ToolClientError::ConnectionLost(e.to_string())
            }
            e @ (ClientError::Protocol(_) | ClientError::Rpc { .. }) => {
                ToolClientError::Protocol(e.to_string())
            }
        }
    }
}

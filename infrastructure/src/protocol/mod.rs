//! Wire protocol: JSON-RPC 2.0 envelopes plus the tool-protocol methods.

pub mod jsonrpc;
pub mod messages;

pub use jsonrpc::{
    IncomingRequest, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcResponseOut,
    MessageKind, RpcError, classify_message, error_codes,
};
pub use messages::{
    CallToolParams, CallToolResult, ContentItem, Implementation, InitializeParams,
    InitializeResult, ListToolsResult, PROTOCOL_VERSION, ServerCapabilities, ToolsCapability,
    methods,
};

use thiserror::Error;

/// A malformed or out-of-place message.
///
/// Protocol errors are answered with a JSON-RPC error object and never end
/// the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Session not initialized: '{0}' received before initialize")]
    NotInitialized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    pub fn code(&self) -> i64 {
        match self {
            ProtocolError::Parse(_) => error_codes::PARSE_ERROR,
            ProtocolError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            ProtocolError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            ProtocolError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            ProtocolError::NotInitialized(_) => error_codes::NOT_INITIALIZED,
            ProtocolError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

impl From<ProtocolError> for RpcError {
    fn from(err: ProtocolError) -> Self {
        RpcError::new(err.code(), err.to_string())
    }
}

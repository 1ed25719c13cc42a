//! Host-side session: handshake, request routing and bookkeeping for one
//! connected client.
//!
//! ```text
//! Listening ──initialize──▶ Ready ──EOF / I/O error──▶ Closed
//!     │  tools/list, tools/call → -32002       │  initialize → -32600
//!     │  ping → {}                              │  ping, tools/list, tools/call
//! ```

use serde::Serialize;
use serde_json::Value;
use toolwire_domain::HostState;
use tracing::{debug, info, warn};

use super::server::ToolHost;
use crate::protocol::{
    CallToolParams, CallToolResult, Implementation, IncomingRequest, InitializeParams,
    InitializeResult, JsonRpcResponseOut, ListToolsResult, MessageKind, PROTOCOL_VERSION,
    ProtocolError, ServerCapabilities, ToolsCapability, classify_message, methods,
};
use crate::transport::TransportError;

/// Summary of one served session
#[derive(Debug, Default)]
pub struct HostSessionReport {
    /// Requests received (including rejected ones).
    pub requests: usize,
    /// `tools/call` requests that reached the registry.
    pub tool_calls: usize,
    /// Requests and frames answered with a JSON-RPC error.
    pub protocol_errors: usize,
    /// Client identity from the handshake.
    pub client: Option<Implementation>,
    pub final_state: HostState,
    /// Set when the session ended on a transport failure instead of EOF.
    pub error: Option<TransportError>,
}

pub(crate) struct HostSession<'a> {
    host: &'a ToolHost,
    state: HostState,
    report: HostSessionReport,
}

impl<'a> HostSession<'a> {
    pub(crate) fn new(host: &'a ToolHost) -> Self {
        Self {
            host,
            state: HostState::Listening,
            report: HostSessionReport {
                final_state: HostState::Listening,
                ..Default::default()
            },
        }
    }

    pub(crate) fn state(&self) -> HostState {
        self.state
    }

    /// Handle one raw frame. Returns the response to send, if any.
    pub(crate) async fn handle_frame(&mut self, frame: &[u8]) -> Option<JsonRpcResponseOut> {
        let value: Value = match serde_json::from_slice(frame) {
            Ok(v) => v,
            Err(e) => {
                warn!("Host: unparseable frame: {}", e);
                self.report.protocol_errors += 1;
                return Some(JsonRpcResponseOut::error(
                    Value::Null,
                    ProtocolError::Parse(e.to_string()).into(),
                ));
            }
        };

        match classify_message(&value) {
            MessageKind::Request => {
                self.report.requests += 1;
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                let outcome = match serde_json::from_value::<IncomingRequest>(value) {
                    Ok(request) => self.handle_request(request).await,
                    Err(e) => Err(ProtocolError::InvalidRequest(e.to_string())),
                };
                Some(match outcome {
                    Ok(result) => JsonRpcResponseOut::success(id, result),
                    Err(e) => {
                        debug!("Host: rejecting request: {}", e);
                        self.report.protocol_errors += 1;
                        JsonRpcResponseOut::error(id, e.into())
                    }
                })
            }
            MessageKind::Notification => {
                let method = value
                    .get("method")
                    .and_then(|m| m.as_str())
                    .unwrap_or_default();
                self.handle_notification(method);
                None
            }
            MessageKind::Response => {
                debug!("Host: ignoring unsolicited response");
                None
            }
            MessageKind::Invalid => {
                self.report.protocol_errors += 1;
                Some(JsonRpcResponseOut::error(
                    Value::Null,
                    ProtocolError::InvalidRequest("message has neither id nor method".into())
                        .into(),
                ))
            }
        }
    }

    async fn handle_request(&mut self, request: IncomingRequest) -> Result<Value, ProtocolError> {
        let method = request.method.as_str();
        debug!(method, state = %self.state, "Host: request");

        match (self.state, method) {
            (_, methods::PING) => Ok(serde_json::json!({})),
            (HostState::Listening, methods::INITIALIZE) => self.initialize(request.params),
            (HostState::Ready, methods::INITIALIZE) => Err(ProtocolError::InvalidRequest(
                "session already initialized".into(),
            )),
            (HostState::Listening, other) => Err(ProtocolError::NotInitialized(other.to_string())),
            (HostState::Ready, methods::LIST_TOOLS) => to_result(&ListToolsResult {
                tools: self.host.registry().list(),
            }),
            (HostState::Ready, methods::CALL_TOOL) => self.call_tool(request.params).await,
            (HostState::Ready, other) => Err(ProtocolError::MethodNotFound(other.to_string())),
            (HostState::Disconnected | HostState::Closed, _) => {
                Err(ProtocolError::InvalidRequest("session is not open".into()))
            }
        }
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            methods::INITIALIZED => {
                debug!("Host: client confirmed initialization");
            }
            other => {
                debug!("Host: ignoring notification '{}'", other);
            }
        }
    }

    fn initialize(&mut self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let params: InitializeParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| ProtocolError::InvalidParams(format!("initialize: {}", e)))?;

        if params.protocol_version != PROTOCOL_VERSION {
            debug!(
                "Host: client requested protocol {}, answering with {}",
                params.protocol_version, PROTOCOL_VERSION
            );
        }

        self.state = self
            .state
            .transition(HostState::Ready)
            .map_err(|e| ProtocolError::Internal(e.to_string()))?;
        self.report.final_state = self.state;
        info!(
            client = %params.client_info.name,
            version = %params.client_info.version,
            "Host: session ready"
        );
        self.report.client = Some(params.client_info);

        to_result(&InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.host.server_info().clone(),
            instructions: self.host.instructions().map(str::to_string),
        })
    }

    async fn call_tool(&mut self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| ProtocolError::InvalidParams(format!("tools/call: {}", e)))?;
        let arguments = params.arguments_map().map_err(ProtocolError::InvalidParams)?;

        self.report.tool_calls += 1;
        let result = self.host.registry().dispatch(&params.name, &arguments).await;
        debug!(
            tool = %params.name,
            success = result.is_success(),
            "Host: tool call finished"
        );
        to_result(&CallToolResult::from(&result))
    }

    /// Move to Closed and hand back the report.
    pub(crate) fn finish(mut self, error: Option<TransportError>) -> HostSessionReport {
        if let Ok(closed) = self.state.transition(HostState::Closed) {
            self.state = closed;
        }
        self.report.final_state = self.state;
        self.report.error = error;
        self.report
    }
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, ProtocolError> {
    serde_json::to_value(value).map_err(|e| ProtocolError::Internal(e.to_string()))
}

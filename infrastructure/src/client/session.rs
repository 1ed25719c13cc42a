//! Client-side session: one transport, one handshake, one call at a time.
//!
//! The transport sits behind an async mutex, so a second caller waits until
//! the in-flight exchange finishes; requests are never pipelined. Every
//! exchange races against the session's [`CancellationToken`] and a
//! deadline, which gives the two ways a blocked caller is released:
//!
//! - [`SessionCloser::close`] from another task → `ConnectionLost`
//! - the deadline passing → `Timeout`
//!
//! Both close the transport, so a late reply can never be read as the
//! answer to a later request. Dropping a request future before it finishes
//! (a cancelled caller) closes the session the same way.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use toolwire_domain::{Arguments, SessionState, ToolCallResult, ToolDescriptor};
use tracing::{debug, info, trace, warn};

use super::config::ClientConfig;
use super::error::{ClientError, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsResult, MessageKind,
    PROTOCOL_VERSION, classify_message, methods,
};
use crate::transport::{ChildProcessTransport, TcpTransport, Transport};

type SharedTransport = Arc<Mutex<Box<dyn Transport>>>;

/// Handle that closes a session from any task.
///
/// A call blocked on the session returns
/// [`ClientError::ConnectionLost`] as soon as `close` is invoked.
#[derive(Clone)]
pub struct SessionCloser {
    token: CancellationToken,
}

impl SessionCloser {
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A connected session with a tool host
pub struct ClientSession {
    transport: SharedTransport,
    state: Arc<RwLock<SessionState>>,
    closed: CancellationToken,
    next_id: AtomicU64,
    call_timeout: Duration,
    server_info: Implementation,
    protocol_version: String,
    tools: RwLock<Vec<ToolDescriptor>>,
}

impl ClientSession {
    /// Spawn or dial the host described by `config` and run the handshake.
    pub async fn open(config: &ClientConfig) -> Result<Self> {
        let transport: Box<dyn Transport> = match &config.connect {
            Some(addr) => Box::new(Self::dial(addr, config).await?),
            None => Box::new(ChildProcessTransport::spawn(
                &config.command,
                &config.args,
                &config.env,
                config.framing,
                config.max_frame_size,
            )?),
        };
        Self::handshake(transport, config).await
    }

    /// Dial a listening host, giving up after the handshake timeout.
    async fn dial(addr: &str, config: &ClientConfig) -> Result<TcpTransport> {
        debug!("Connecting to tool host at {}", addr);
        let connect = TcpTransport::connect(addr, config.framing);
        match tokio::time::timeout(config.handshake_timeout, connect).await {
            Ok(transport) => Ok(transport?.with_max_frame_size(config.max_frame_size)),
            Err(_) => {
                warn!("Connecting to {} timed out", addr);
                Err(ClientError::Timeout(config.handshake_timeout))
            }
        }
    }

    /// Run the handshake over an already-open transport.
    ///
    /// On success the session is Ready with the host's tool list cached. On
    /// failure the transport is closed.
    pub async fn handshake(transport: Box<dyn Transport>, config: &ClientConfig) -> Result<Self> {
        let mut session = Self {
            transport: Arc::new(Mutex::new(transport)),
            state: Arc::new(RwLock::new(SessionState::Connecting)),
            closed: CancellationToken::new(),
            next_id: AtomicU64::new(1),
            call_timeout: config.call_timeout,
            server_info: Implementation::new("", ""),
            protocol_version: String::new(),
            tools: RwLock::new(Vec::new()),
        };
        session.spawn_close_watcher();

        match session.initialize(config).await {
            Ok(()) => {
                session.set_state(SessionState::Ready);
                info!(
                    server = %session.server_info.name,
                    version = %session.server_info.version,
                    tools = session.tools().len(),
                    "Connected to tool host"
                );
                Ok(session)
            }
            Err(e) => {
                warn!("Handshake with {} failed: {}", config.endpoint(), e);
                session.shutdown().await;
                Err(e)
            }
        }
    }

    async fn initialize(&mut self, config: &ClientConfig) -> Result<()> {
        let params = InitializeParams::new(Implementation::new(
            config.client_name.clone(),
            env!("CARGO_PKG_VERSION"),
        ));
        let result: InitializeResult = self
            .request(
                methods::INITIALIZE,
                Some(to_params(&params)?),
                config.handshake_timeout,
            )
            .await?;

        if result.protocol_version != PROTOCOL_VERSION {
            warn!(
                "Tool host speaks protocol {}, expected {}",
                result.protocol_version, PROTOCOL_VERSION
            );
        }
        self.server_info = result.server_info;
        self.protocol_version = result.protocol_version;

        self.notify(methods::INITIALIZED).await?;

        let listing: ListToolsResult = self
            .request(
                methods::LIST_TOOLS,
                Some(serde_json::json!({})),
                config.handshake_timeout,
            )
            .await?;
        *self.tools.write().unwrap_or_else(|e| e.into_inner()) = listing.tools;
        Ok(())
    }

    /// Close the transport once the token fires, even if no call is pending.
    fn spawn_close_watcher(&self) {
        let token = self.closed.clone();
        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            token.cancelled().await;
            let mut transport = transport.lock().await;
            if let Err(e) = transport.close().await {
                debug!("Closing transport failed: {}", e);
            }
            let mut state = state.write().unwrap_or_else(|e| e.into_inner());
            if state.can_transition_to(SessionState::Closed) {
                *state = SessionState::Closed;
            }
        });
    }

    pub fn state(&self) -> SessionState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match state.transition(next) {
            Ok(s) => *state = s,
            Err(e) => trace!("Ignoring state change: {}", e),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready() && !self.closed.is_cancelled()
    }

    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Tool descriptors cached from the handshake (or the last refresh).
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|t| t.name == name)
    }

    pub fn closer(&self) -> SessionCloser {
        SessionCloser {
            token: self.closed.clone(),
        }
    }

    /// Re-query `tools/list` and replace the cache.
    pub async fn refresh_tools(&self) -> Result<Vec<ToolDescriptor>> {
        self.ensure_ready()?;
        let listing: ListToolsResult = self
            .request(
                methods::LIST_TOOLS,
                Some(serde_json::json!({})),
                self.call_timeout,
            )
            .await?;
        *self.tools.write().unwrap_or_else(|e| e.into_inner()) = listing.tools.clone();
        Ok(listing.tools)
    }

    /// Invoke a tool. The name is not checked against the cache here.
    pub async fn call_tool(&self, name: &str, arguments: Arguments) -> Result<ToolCallResult> {
        self.ensure_ready()?;
        let params = CallToolParams::new(name, arguments);
        let wire: CallToolResult = self
            .request(
                methods::CALL_TOOL,
                Some(to_params(&params)?),
                self.call_timeout,
            )
            .await?;
        Ok(wire.into())
    }

    pub async fn ping(&self) -> Result<()> {
        self.ensure_ready()?;
        let _: Value = self.request(methods::PING, None, self.call_timeout).await?;
        Ok(())
    }

    /// Close the session. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.closed.cancel();
        let mut transport = self.transport.lock().await;
        if let Err(e) = transport.close().await {
            debug!("Closing transport failed: {}", e);
        }
        drop(transport);
        self.set_state(SessionState::Closed);
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ClientError::NotConnected)
        }
    }

    async fn notify(&self, method: &str) -> Result<()> {
        let notification = JsonRpcNotification::new(method, None);
        let bytes = serde_json::to_vec(&notification)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        let mut transport = self.transport.lock().await;
        transport
            .send(&bytes)
            .await
            .map_err(|e| ClientError::ConnectionLost(e.to_string()))
    }

    /// Send one request and wait for its response.
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);
        let bytes =
            serde_json::to_vec(&request).map_err(|e| ClientError::Protocol(e.to_string()))?;

        let mut transport = self.transport.lock().await;
        if self.closed.is_cancelled() {
            return Err(ClientError::NotConnected);
        }

        let mut abandoned = AbandonGuard::new(&self.closed, method);
        let outcome = {
            let exchange = exchange(&mut **transport, &bytes, id);
            tokio::select! {
                biased;
                _ = self.closed.cancelled() => {
                    Err(ClientError::ConnectionLost("session closed".into()))
                }
                result = tokio::time::timeout(timeout, exchange) => {
                    result.unwrap_or(Err(ClientError::Timeout(timeout)))
                }
            }
        };
        abandoned.disarm();

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                if e.is_fatal() {
                    warn!(method, "Closing session: {}", e);
                    self.closed.cancel();
                    if let Err(close_err) = transport.close().await {
                        debug!("Closing transport failed: {}", close_err);
                    }
                    drop(transport);
                    self.set_state(SessionState::Closed);
                }
                return Err(e);
            }
        };
        drop(transport);

        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let result = response.result.unwrap_or(Value::Null);
        serde_json::from_value(result)
            .map_err(|e| ClientError::Protocol(format!("invalid {} result: {}", method, e)))
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        // Wakes the close watcher, which closes the transport
        self.closed.cancel();
    }
}

/// Closes the session when a request future is dropped mid-exchange, since
/// a half-written or half-read frame leaves the stream unusable.
struct AbandonGuard<'a> {
    closed: &'a CancellationToken,
    method: &'a str,
    armed: bool,
}

impl<'a> AbandonGuard<'a> {
    fn new(closed: &'a CancellationToken, method: &'a str) -> Self {
        Self {
            closed,
            method,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(method = self.method, "Request abandoned mid-exchange, closing session");
            self.closed.cancel();
        }
    }
}

/// Write `bytes`, then read frames until the response carrying `id` arrives.
async fn exchange(
    transport: &mut (dyn Transport + 'static),
    bytes: &[u8],
    id: u64,
) -> Result<JsonRpcResponse> {
    transport
        .send(bytes)
        .await
        .map_err(|e| ClientError::ConnectionLost(e.to_string()))?;

    loop {
        let frame = transport
            .receive()
            .await
            .map_err(|e| ClientError::ConnectionLost(e.to_string()))?
            .ok_or_else(|| ClientError::ConnectionLost("host closed the connection".into()))?;

        let value: Value = match serde_json::from_slice(&frame) {
            Ok(v) => v,
            Err(e) => {
                warn!("Discarding unparseable frame from host: {}", e);
                continue;
            }
        };

        match classify_message(&value) {
            MessageKind::Response => {}
            MessageKind::Invalid => {
                // An error reply to a frame the host could not parse has a null id
                if value.get("error").is_some() {
                    warn!("Host reported an error without an id: {}", value["error"]);
                }
                continue;
            }
            MessageKind::Request | MessageKind::Notification => {
                trace!("Ignoring host-initiated message: {}", value);
                continue;
            }
        }

        let response: JsonRpcResponse = serde_json::from_value(value)
            .map_err(|e| ClientError::Protocol(format!("malformed response: {}", e)))?;
        if response.numeric_id() == Some(id) {
            return Ok(response);
        }
        debug!(
            "Discarding response for id {:?} while waiting for {}",
            response.id, id
        );
    }
}

fn to_params<T: serde::Serialize>(params: &T) -> Result<Value> {
    serde_json::to_value(params).map_err(|e| ClientError::Protocol(e.to_string()))
}

//! [`ToolClient`]: the facade applications use to reach a tool host.
//!
//! Wraps at most one live [`ClientSession`]. Connecting again while Ready is
//! a no-op; after the session closes (disconnect, timeout, lost connection)
//! a fresh `connect` starts a new one. Implements [`ToolClientPort`] so the
//! adapter loop can drive it.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use toolwire_application::{ToolClientError, ToolClientPort};
use toolwire_domain::{Arguments, SessionState, ToolCallRequest, ToolCallResult, ToolDescriptor};
use tracing::{debug, info};

use super::config::ClientConfig;
use super::error::{ClientError, Result};
use super::session::{ClientSession, SessionCloser};
use crate::protocol::Implementation;
use crate::transport::Transport;

pub struct ToolClient {
    config: ClientConfig,
    session: RwLock<Option<Arc<ClientSession>>>,
}

impl ToolClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session: RwLock::new(None),
        }
    }

    /// Create a client and connect it in one step.
    pub async fn connect_with(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config);
        client.connect().await?;
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn current(&self) -> Option<Arc<ClientSession>> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn ready_session(&self) -> Result<Arc<ClientSession>> {
        self.current()
            .filter(|s| s.is_ready())
            .ok_or(ClientError::NotConnected)
    }

    fn install(&self, session: ClientSession) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(session));
    }

    /// Open a session with the configured host.
    pub async fn connect(&self) -> Result<()> {
        if self.is_ready() {
            debug!("Already connected to {}", self.config.endpoint());
            return Ok(());
        }
        info!("Connecting to tool host: {}", self.config.endpoint());
        let session = ClientSession::open(&self.config).await?;
        self.install(session);
        Ok(())
    }

    /// Open a session over a transport the caller already holds.
    pub async fn connect_transport(&self, transport: Box<dyn Transport>) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        let session = ClientSession::handshake(transport, &self.config).await?;
        self.install(session);
        Ok(())
    }

    /// Drop the current session (if any) and connect again.
    pub async fn reconnect(&self) -> Result<()> {
        self.disconnect().await;
        self.connect().await
    }

    /// Close the session, leaving it in `Closed`. Calling this again, or
    /// before any connect, does nothing.
    pub async fn disconnect(&self) {
        let Some(session) = self.current() else {
            return;
        };
        let was_open = !session.state().is_closed();
        session.shutdown().await;
        if was_open {
            info!("Disconnected from {}", self.config.endpoint());
        }
    }

    pub fn state(&self) -> SessionState {
        self.current()
            .map(|s| s.state())
            .unwrap_or(SessionState::Disconnected)
    }

    pub fn is_ready(&self) -> bool {
        self.current().is_some_and(|s| s.is_ready())
    }

    pub fn server_info(&self) -> Option<Implementation> {
        self.current().map(|s| s.server_info().clone())
    }

    /// Closer for the current session, usable from another task.
    pub fn closer(&self) -> Option<SessionCloser> {
        self.current().map(|s| s.closer())
    }

    /// Tools cached at handshake time.
    pub fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self.ready_session()?.tools())
    }

    /// Ask the host for its tool list again and refresh the cache.
    pub async fn list_tools_remote(&self) -> Result<Vec<ToolDescriptor>> {
        self.ready_session()?.refresh_tools().await
    }

    pub async fn ping(&self) -> Result<()> {
        self.ready_session()?.ping().await
    }

    /// Invoke a tool by name.
    ///
    /// Names missing from the cached list fail with
    /// [`ClientError::UnknownTool`] without a round trip. Failures reported
    /// by the tool itself come back as `Ok(ToolCallResult::Failure(..))`.
    pub async fn call_tool(&self, name: &str, arguments: Arguments) -> Result<ToolCallResult> {
        let session = self.ready_session()?;
        if !session.has_tool(name) {
            return Err(ClientError::UnknownTool(name.to_string()));
        }
        session.call_tool(name, arguments).await
    }
}

#[async_trait]
impl ToolClientPort for ToolClient {
    fn tools(&self) -> Vec<ToolDescriptor> {
        self.list_tools().unwrap_or_default()
    }

    async fn call_tool(
        &self,
        request: &ToolCallRequest,
    ) -> std::result::Result<ToolCallResult, ToolClientError> {
        ToolClient::call_tool(self, &request.tool_name, request.arguments.clone())
            .await
            .map_err(ToolClientError::from)
    }

    async fn ping(&self) -> std::result::Result<(), ToolClientError> {
        ToolClient::ping(self).await.map_err(ToolClientError::from)
    }
}

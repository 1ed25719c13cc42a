//! [`ToolHost`]: serves a shared [`ToolRegistry`] over any [`Transport`].

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::session::{HostSession, HostSessionReport};
use crate::protocol::Implementation;
use crate::tools::ToolRegistry;
use crate::transport::{
    DEFAULT_MAX_FRAME_SIZE, Framing, TcpTransport, Transport, TransportError,
};

/// Default server name advertised in the handshake.
pub const DEFAULT_SERVER_NAME: &str = "toolwire";

/// Tool host: one registry, any number of sessions.
///
/// Each session runs its requests strictly one after another; separate
/// sessions (TCP connections) run concurrently over the same registry.
pub struct ToolHost {
    registry: Arc<ToolRegistry>,
    server_info: Implementation,
    instructions: Option<String>,
    max_frame_size: usize,
}

impl ToolHost {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            server_info: Implementation::new(DEFAULT_SERVER_NAME, env!("CARGO_PKG_VERSION")),
            instructions: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    pub fn with_server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.server_info = Implementation::new(name, version);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Frame size limit for connections accepted by [`serve_tcp`](Self::serve_tcp)
    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// Run one session until the peer disconnects or the transport fails.
    pub async fn serve<T: Transport>(&self, mut transport: T) -> HostSessionReport {
        let peer = transport.describe();
        let stats = self.registry.stats();
        info!(
            peer = %peer,
            tools = stats.total_tools,
            required_params = stats.required_params,
            "Host: listening for initialize"
        );

        let mut session = HostSession::new(self);
        let mut failure: Option<TransportError> = None;

        loop {
            let frame = match transport.receive().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    debug!(peer = %peer, "Host: peer closed the stream");
                    break;
                }
                Err(e) => {
                    warn!(peer = %peer, "Host: transport error: {}", e);
                    failure = Some(e);
                    break;
                }
            };

            let Some(response) = session.handle_frame(&frame).await else {
                continue;
            };

            let bytes = match serde_json::to_vec(&response) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Host: failed to serialize response: {}", e);
                    continue;
                }
            };

            if let Err(e) = transport.send(&bytes).await {
                warn!(peer = %peer, "Host: failed to send response: {}", e);
                failure = Some(e);
                break;
            }
        }

        if let Err(e) = transport.close().await {
            debug!("Host: closing transport failed: {}", e);
        }
        let state = session.state();
        let report = session.finish(failure);
        info!(
            peer = %peer,
            requests = report.requests,
            tool_calls = report.tool_calls,
            from = %state,
            "Host: session closed"
        );
        report
    }

    /// Accept TCP connections until `shutdown` fires, serving each one as an
    /// independent session.
    pub async fn serve_tcp(
        self: Arc<Self>,
        listener: TcpListener,
        framing: Framing,
        shutdown: CancellationToken,
    ) -> Result<(), TransportError> {
        info!("Host: accepting connections on {}", listener.local_addr()?);

        loop {
            let (stream, addr) = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Host: shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => accepted?,
            };

            debug!("Host: accepted connection from {}", addr);
            if let Err(e) = stream.set_nodelay(true) {
                debug!("Host: set_nodelay failed for {}: {}", addr, e);
            }

            let host = Arc::clone(&self);
            let session_shutdown = shutdown.child_token();
            tokio::spawn(async move {
                let transport = TcpTransport::from_stream(stream, framing)
                    .with_max_frame_size(host.max_frame_size);
                tokio::select! {
                    _ = session_shutdown.cancelled() => {
                        debug!("Host: dropping session with {} on shutdown", addr);
                    }
                    report = host.serve(transport) => {
                        debug!(
                            "Host: session with {} ended after {} requests",
                            addr, report.requests
                        );
                    }
                }
            });
        }
    }
}

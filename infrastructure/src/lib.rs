//! Infrastructure layer for toolwire
//!
//! Everything that touches bytes, processes, sockets or files:
//!
//! - [`transport`]: framed byte streams (stdio, child process, TCP)
//! - [`protocol`]: JSON-RPC envelopes and protocol message types
//! - [`host`]: the host-side session engine serving a [`ToolRegistry`]
//! - [`client`]: the client-side session engine and [`ToolClient`]
//! - [`model`]: reasoning-model adapters (Gemini behind the `gemini` feature)
//! - [`config`] and [`logging`]: file configuration and transcripts

pub mod client;
pub mod config;
pub mod host;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod tools;
pub mod transport;

// Re-export commonly used types
pub use client::{ClientConfig, ClientError, SessionCloser, ToolClient};
pub use config::{ConfigLoader, ConfigSource, ConfigValidationError, FileConfig};
pub use host::{HostSessionReport, ToolHost};
pub use logging::JsonlConversationLogger;
pub use protocol::{Implementation, PROTOCOL_VERSION};
pub use tools::{ToolRegistry, register_builtin_tools};
pub use transport::{
    ChildProcessTransport, Framing, StdioTransport, TcpTransport, Transport, TransportError,
};

#[cfg(feature = "gemini")]
pub use model::gemini::{GeminiConfig, GeminiModel};

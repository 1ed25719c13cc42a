//! Tool client: spawn or dial a host, handshake, list and call tools.

pub mod config;
pub mod error;
mod session;
mod tool_client;

pub use config::{
    ClientConfig, DEFAULT_CALL_TIMEOUT, DEFAULT_CLIENT_NAME, DEFAULT_HANDSHAKE_TIMEOUT,
};
pub use error::ClientError;
pub use session::{ClientSession, SessionCloser};
pub use tool_client::ToolClient;

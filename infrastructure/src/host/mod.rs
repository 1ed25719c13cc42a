//! Host-side session engine.
//!
//! [`ToolHost`] publishes a [`ToolRegistry`](crate::tools::ToolRegistry) to
//! clients: it answers the `initialize` handshake, lists tools in
//! registration order and dispatches `tools/call` requests. Malformed or
//! out-of-order messages get a JSON-RPC error and the session carries on;
//! only a transport failure or EOF ends it.

mod server;
mod session;

pub use server::{DEFAULT_SERVER_NAME, ToolHost};
pub use session::HostSessionReport;

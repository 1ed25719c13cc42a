//! Session domain module
//!
//! Lifecycle state machines for both ends of a tool session, plus the
//! conversation and model-response types used by the adapter loop.

pub mod entities;
pub mod response;
pub mod state;

pub use entities::{Conversation, Role, Turn, TurnContent};
pub use response::{ContentBlock, ModelResponse};
pub use state::{HostState, SessionState};

//! Conversation transcript logging.
//!
//! [`JsonlConversationLogger`] implements the
//! [`ConversationLogger`](toolwire_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;

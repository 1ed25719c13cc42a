//! Google Gemini function-calling adapter
//!
//! Declares tools as `functionDeclarations`, maps `functionCall` parts to
//! tool-call intents and sends tool results back as `functionResponse`
//! parts.

mod dialect;
mod model;
mod types;

pub use dialect::GeminiDialect;
pub use model::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_REQUEST_TIMEOUT, GeminiConfig,
    GeminiModel,
};

//! Reasoning-model adapters

#[cfg(feature = "gemini")]
pub mod gemini;

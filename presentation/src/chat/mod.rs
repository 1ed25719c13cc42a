//! Interactive chat module
//!
//! Provides a readline-based chat in which a reasoning model answers each
//! utterance, calling the host's tools through the adapter loop.

mod repl;

pub use repl::ChatRepl;

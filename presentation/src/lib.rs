//! Presentation layer for toolwire
//!
//! This crate contains CLI definitions, output formatters, progress
//! reporters, the interactive tool client and the chat interface.

pub mod chat;
pub mod cli;
pub mod interactive;
pub mod output;
pub mod progress;

use std::path::PathBuf;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, Command, FramingArg, OutputFormat};
pub use interactive::ToolRepl;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};

/// REPL history file under the platform data directory, created on demand
pub(crate) fn history_path(file_name: &str) -> Option<PathBuf> {
    let dir = dirs::data_dir()?.join("toolwire");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(file_name))
}

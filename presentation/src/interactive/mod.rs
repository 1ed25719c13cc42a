//! Interactive tool client
//!
//! A readline-based REPL for listing and calling a host's tools by hand.

mod command;
mod repl;

pub use command::{ReplCommand, parse_line};
pub use repl::ToolRepl;

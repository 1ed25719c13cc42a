//! Tool registry and built-in tools
//!
//! - [`ToolRegistry`]: name → descriptor + executor, validation and dispatch
//! - [`builtin`]: the `echo` and `sum` demo tools served by the bundled host

pub mod builtin;

mod registry;

pub use builtin::register_builtin_tools;
pub use registry::{RegistryStats, ToolRegistry};

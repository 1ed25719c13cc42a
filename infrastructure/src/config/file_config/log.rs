//! Log output configuration from TOML (`[log]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
///
/// Diagnostics always go to stderr; `dir` adds a daily-rotated file copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Directory for rotated diagnostic logs
    pub dir: Option<String>,
    /// File name prefix inside `dir`
    pub file_prefix: String,
    /// JSONL transcript of chat sessions
    pub conversation_file: Option<String>,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_prefix: "toolwire.log".to_string(),
            conversation_file: None,
        }
    }
}

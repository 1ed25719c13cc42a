//! Host configuration from TOML (`[host]` section)

use serde::{Deserialize, Serialize};
use toolwire_domain::UnknownFieldPolicy;

use crate::host::DEFAULT_SERVER_NAME;
use crate::transport::{DEFAULT_MAX_FRAME_SIZE, Framing};

/// What the registry does with arguments the schema does not declare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileUnknownFields {
    #[default]
    Reject,
    Ignore,
}

impl From<FileUnknownFields> for UnknownFieldPolicy {
    fn from(value: FileUnknownFields) -> Self {
        match value {
            FileUnknownFields::Reject => UnknownFieldPolicy::Reject,
            FileUnknownFields::Ignore => UnknownFieldPolicy::Ignore,
        }
    }
}

/// Raw host configuration from TOML
///
/// # Example
///
/// ```toml
/// [host]
/// name = "sales-analytics"
/// listen = "127.0.0.1:7070"   # omit to serve over stdio
/// unknown_fields = "ignore"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHostConfig {
    /// Server name advertised in the handshake
    pub name: String,
    /// Server version (defaults to the crate version)
    pub version: Option<String>,
    /// Free-form usage hints sent with the handshake
    pub instructions: Option<String>,
    /// TCP address to listen on instead of stdio
    pub listen: Option<String>,
    pub framing: Framing,
    pub max_frame_size: usize,
    pub unknown_fields: FileUnknownFields,
}

impl Default for FileHostConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: None,
            instructions: None,
            listen: None,
            framing: Framing::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            unknown_fields: FileUnknownFields::default(),
        }
    }
}

impl FileHostConfig {
    pub fn version_or_default(&self) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
    }
}

//! Client configuration from TOML (`[client]` section)

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ClientConfig, DEFAULT_CLIENT_NAME};
use crate::transport::{DEFAULT_MAX_FRAME_SIZE, Framing};

/// Raw client configuration from TOML
///
/// # Example
///
/// ```toml
/// [client]
/// command = "python3"
/// args = ["sales_server.py"]
/// framing = "json_lines"
/// call_timeout_secs = 120
///
/// [client.env]
/// DATA_DIR = "./data"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClientConfig {
    /// Host executable to spawn
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the spawned host
    pub env: BTreeMap<String, String>,
    /// `host:port` to dial instead of spawning
    pub connect: Option<String>,
    pub framing: Framing,
    pub max_frame_size: usize,
    pub handshake_timeout_secs: u64,
    pub call_timeout_secs: u64,
    pub client_name: String,
}

impl Default for FileClientConfig {
    fn default() -> Self {
        Self {
            command: "toolwire".to_string(),
            args: vec!["serve".to_string()],
            env: BTreeMap::new(),
            connect: None,
            framing: Framing::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            handshake_timeout_secs: 30,
            call_timeout_secs: 60,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }
}

impl FileClientConfig {
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            command: self.command.clone(),
            args: self.args.clone(),
            env: self
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            connect: self.connect.clone(),
            framing: self.framing,
            max_frame_size: self.max_frame_size,
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
            call_timeout: Duration::from_secs(self.call_timeout_secs),
            client_name: self.client_name.clone(),
        }
    }
}

//! Client connection settings

use std::time::Duration;

use crate::transport::{DEFAULT_MAX_FRAME_SIZE, Framing};

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CLIENT_NAME: &str = "toolwire-client";

/// How to reach a tool host and how long to wait for it
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Host executable, spawned with piped stdio.
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the spawned host.
    pub env: Vec<(String, String)>,
    /// Connect to `host:port` instead of spawning `command`.
    pub connect: Option<String>,
    pub framing: Framing,
    pub max_frame_size: usize,
    pub handshake_timeout: Duration,
    pub call_timeout: Duration,
    pub client_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command: "toolwire".to_string(),
            args: vec!["serve".to_string()],
            env: Vec::new(),
            connect: None,
            framing: Framing::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Spawn `command` with no arguments.
    pub fn spawn(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            ..Default::default()
        }
    }

    /// Connect over TCP.
    pub fn tcp(addr: impl Into<String>) -> Self {
        Self {
            connect: Some(addr.into()),
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Human-readable endpoint for logs and error messages.
    pub fn endpoint(&self) -> String {
        match &self.connect {
            Some(addr) => format!("tcp://{}", addr),
            None if self.args.is_empty() => self.command.clone(),
            None => format!("{} {}", self.command, self.args.join(" ")),
        }
    }
}

//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout one-to-one. Each section
//! converts into the runtime type its layer consumes.

mod agent;
mod client;
mod host;
mod log;
mod model;

pub use agent::FileAgentConfig;
pub use client::FileClientConfig;
pub use host::{FileHostConfig, FileUnknownFields};
pub use log::FileLogConfig;
pub use model::{API_KEY_ENV, FileModelConfig, MODEL_ENV};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("agent.max_tool_rounds must be at least 1")]
    ZeroToolRounds,

    #[error("client.command cannot be empty")]
    EmptyCommand,

    #[error("agent.temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("{0} cannot be 0")]
    ZeroFrameSize(&'static str),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub client: FileClientConfig,
    pub host: FileHostConfig,
    pub agent: FileAgentConfig,
    pub model: FileModelConfig,
    pub log: FileLogConfig,
}

impl FileConfig {
    /// Check every section, returning all problems found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.client.connect.is_none() && self.client.command.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyCommand);
        }
        if self.client.handshake_timeout_secs == 0 {
            errors.push(ConfigValidationError::ZeroTimeout(
                "client.handshake_timeout_secs",
            ));
        }
        if self.client.call_timeout_secs == 0 {
            errors.push(ConfigValidationError::ZeroTimeout("client.call_timeout_secs"));
        }
        if self.model.timeout_secs == 0 {
            errors.push(ConfigValidationError::ZeroTimeout("model.timeout_secs"));
        }
        if self.client.max_frame_size == 0 {
            errors.push(ConfigValidationError::ZeroFrameSize("client.max_frame_size"));
        }
        if self.host.max_frame_size == 0 {
            errors.push(ConfigValidationError::ZeroFrameSize("host.max_frame_size"));
        }
        if self.agent.max_tool_rounds == 0 {
            errors.push(ConfigValidationError::ZeroToolRounds);
        }
        if !(0.0..=2.0).contains(&self.agent.temperature) {
            errors.push(ConfigValidationError::InvalidTemperature(
                self.agent.temperature,
            ));
        }

        errors
    }
}

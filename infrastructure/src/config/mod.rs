//! Configuration file loading for toolwire
//!
//! Sources, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. Global: `$XDG_CONFIG_HOME/toolwire/config.toml`
//! 3. Project: `./toolwire.toml` or `./.toolwire.toml`
//! 4. `--config <path>`
//! 5. `TOOLWIRE_*` environment variables

mod file_config;
mod loader;

pub use file_config::{
    API_KEY_ENV, ConfigValidationError, FileAgentConfig, FileClientConfig, FileConfig,
    FileHostConfig, FileLogConfig, FileModelConfig, FileUnknownFields, MODEL_ENV,
};
pub use loader::{ConfigLoader, ConfigSource};

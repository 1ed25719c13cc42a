//! Adapter loop configuration from TOML (`[agent]` section)

use serde::{Deserialize, Serialize};
use toolwire_application::AdapterParams;

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// max_tool_rounds = 5
/// temperature = 0.2
/// system_prompt = "You answer questions about sales data."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Model round-trips that may request tools before the loop gives up
    pub max_tool_rounds: usize,
    pub temperature: f32,
    pub system_prompt: Option<String>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let params = AdapterParams::default();
        Self {
            max_tool_rounds: params.max_tool_rounds,
            temperature: params.temperature,
            system_prompt: None,
        }
    }
}

impl FileAgentConfig {
    pub fn to_adapter_params(&self) -> AdapterParams {
        AdapterParams::default()
            .with_max_tool_rounds(self.max_tool_rounds)
            .with_temperature(self.temperature)
    }
}

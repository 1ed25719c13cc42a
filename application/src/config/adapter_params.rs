//! Adapter loop parameters.
//!
//! [`AdapterParams`] groups the static parameters that control
//! [`RunAdapterLoopUseCase`](crate::use_cases::run_adapter_loop::RunAdapterLoopUseCase).

use serde::{Deserialize, Serialize};

/// Adapter loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterParams {
    /// Maximum tool rounds per user utterance before the loop gives up.
    pub max_tool_rounds: usize,
    /// Sampling temperature forwarded to the reasoning model.
    pub temperature: f32,
}

impl Default for AdapterParams {
    fn default() -> Self {
        Self {
            max_tool_rounds: 10,
            temperature: 0.7,
        }
    }
}

impl AdapterParams {
    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

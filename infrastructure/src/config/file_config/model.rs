//! Reasoning model configuration from TOML (`[model]` section)

use serde::{Deserialize, Serialize};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";

/// Raw model configuration from TOML
///
/// Values set here win over the `GEMINI_API_KEY` / `GEMINI_MODEL`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub provider: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: None,
            model: None,
            base_url: None,
            timeout_secs: 120,
        }
    }
}

impl FileModelConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| non_empty(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn resolve_model(&self) -> Option<String> {
        non_empty(self.model.clone()).or_else(|| non_empty(std::env::var(MODEL_ENV).ok()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//! `generateContent` client implementing [`ReasoningModel`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use toolwire_application::{FunctionDialect, GenerationParams, ModelError, ReasoningModel};
use toolwire_domain::{Conversation, ModelResponse};
use tracing::debug;

use super::dialect::GeminiDialect;
use super::types::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Gemini function-calling model
pub struct GeminiModel {
    config: GeminiConfig,
    http: Client,
    dialect: GeminiDialect,
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::NotConfigured(
                "Gemini API key is empty (set GEMINI_API_KEY or [model].api_key)".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::NotConfigured(e.to_string()))?;
        Ok(Self {
            config,
            http,
            dialect: GeminiDialect,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ReasoningModel for GeminiModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn dialect(&self) -> &dyn FunctionDialect {
        &self.dialect
    }

    async fn generate(
        &self,
        conversation: &Conversation,
        functions: &[Value],
        params: GenerationParams,
    ) -> Result<ModelResponse, ModelError> {
        let body = GenerateContentRequest::new(conversation, functions, params.temperature);
        debug!(
            model = %self.config.model,
            turns = conversation.len(),
            functions = functions.len(),
            "Calling Gemini generateContent"
        );

        let response = self
            .http
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    ModelError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| match b.error.status {
                    Some(s) => format!("{}: {}", s, b.error.message),
                    None => b.error.message,
                })
                .unwrap_or(text);
            return Err(ModelError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        let response = parsed
            .into_model_response()
            .ok_or_else(|| ModelError::InvalidResponse("no candidates in response".into()))?;

        debug!(
            blocks = response.content.len(),
            tool_calls = response.has_tool_calls(),
            "Gemini responded"
        );
        Ok(response)
    }
}

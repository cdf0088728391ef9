use super::{describe_api_error, CompletionRequest, LLMClient};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{LLMConfig, LLMProvider};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Chat-completions client for OpenAI-compatible endpoints (OpenAI,
/// OpenRouter, Together and local servers).
pub struct OpenAIClient {
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<Option<String>> {
        match (&config.api_key, config.provider) {
            (Some(key), _) if !key.trim().is_empty() => Ok(Some(key.clone())),
            (_, LLMProvider::Local) => Ok(None),
            (_, provider) => Err(AppError::LLMError(format!(
                "Missing API key for {:?} provider",
                provider
            ))),
        }
    }

    fn endpoint(config: &LLMConfig) -> String {
        if config.base_url.ends_with('/') {
            format!("{}chat/completions", config.base_url)
        } else {
            format!("{}/chat/completions", config.base_url)
        }
    }
}

impl Default for OpenAIClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn complete(&self, config: &LLMConfig, request: &CompletionRequest<'_>) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let url = Self::endpoint(config);

        let body = json!({
            "model": config.model,
            "messages": [
                {
                    "role": "system",
                    "content": request.persona
                },
                {
                    "role": "user",
                    "content": request.user_prompt()
                }
            ],
            "max_tokens": request.params.max_output_tokens,
            "temperature": request.params.temperature,
        });

        let mut builder = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(request.params.timeout_secs))
            .json(&body);
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::LLMError(format!(
                    "Request timed out after {}s",
                    request.params.timeout_secs
                ))
            } else {
                AppError::LLMError(format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(describe_api_error(status, &text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::LLMError("Invalid response format".to_string()))
    }
}

pub mod gemini;
pub mod openai;

use crate::domain::error::Result;
use crate::domain::llm_config::{GenerationParams, LLMConfig, LLMProvider};
use async_trait::async_trait;
use gemini::GeminiClient;
use openai::OpenAIClient;

/// One generation call: who the model should be, what it should do, and the
/// material it should work from.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub persona: &'a str,
    pub instructions: &'a str,
    pub context: &'a str,
    pub params: GenerationParams,
}

impl CompletionRequest<'_> {
    pub fn user_prompt(&self) -> String {
        format!("{}\n\n---\n{}", self.instructions.trim(), self.context)
    }
}

#[async_trait]
pub trait LLMClient {
    async fn complete(&self, config: &LLMConfig, request: &CompletionRequest<'_>) -> Result<String>;
}

pub struct RouterClient {
    openai: OpenAIClient,
    gemini: GeminiClient,
}

impl RouterClient {
    pub fn new() -> Self {
        Self {
            openai: OpenAIClient::new(),
            gemini: GeminiClient::new(),
        }
    }
}

impl Default for RouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for RouterClient {
    async fn complete(&self, config: &LLMConfig, request: &CompletionRequest<'_>) -> Result<String> {
        match config.provider {
            LLMProvider::Google => self.gemini.complete(config, request).await,
            _ => self.openai.complete(config, request).await,
        }
    }
}

/// Turns a non-success HTTP status into a message a user can act on.
pub(crate) fn describe_api_error(status: reqwest::StatusCode, body: &str) -> String {
    match status.as_u16() {
        401 | 403 => "Invalid or missing API key".to_string(),
        402 => "Insufficient credits or quota".to_string(),
        429 => "Rate limited by the provider".to_string(),
        404 => format!("Model or endpoint not found: {}", body),
        500 | 502 | 503 => "Provider is temporarily unavailable".to_string(),
        _ => format!("API error ({}): {}", status, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_puts_instructions_before_context() {
        let request = CompletionRequest {
            persona: "Lead QA",
            instructions: "List modules. ",
            context: "BRD text",
            params: GenerationParams::default(),
        };
        assert_eq!(request.user_prompt(), "List modules.\n\n---\nBRD text");
    }

    #[test]
    fn test_describe_api_error() {
        assert_eq!(
            describe_api_error(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            "Rate limited by the provider"
        );
        assert_eq!(
            describe_api_error(reqwest::StatusCode::BAD_REQUEST, "bad"),
            "API error (400 Bad Request): bad"
        );
    }
}

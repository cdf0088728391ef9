use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LLMProvider {
    Local,
    OpenAI,
    OpenRouter,
    Together,
    Google,
}

impl LLMProvider {
    /// Environment variable conventionally holding this vendor's key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LLMProvider::Local => None,
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
            LLMProvider::Together => Some("TOGETHER_API_KEY"),
            LLMProvider::Google => Some("GEMINI_API_KEY"),
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::Local => "http://localhost:1234/v1",
            LLMProvider::OpenAI => "https://api.openai.com/v1",
            LLMProvider::OpenRouter => "https://openrouter.ai/api/v1",
            LLMProvider::Together => "https://api.together.xyz/v1",
            LLMProvider::Google => "https://generativelanguage.googleapis.com/v1beta/models",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::Local => "local-model",
            LLMProvider::OpenAI => "gpt-4o-mini",
            LLMProvider::OpenRouter => "meta-llama/llama-3.1-8b-instruct",
            LLMProvider::Together => "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
            LLMProvider::Google => "gemini-1.5-flash",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    #[validate(url)]
    pub base_url: String,
    #[validate(length(min = 1))]
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Together,
            base_url: LLMProvider::Together.default_base_url().to_string(),
            model: LLMProvider::Together.default_model().to_string(),
            api_key: None,
        }
    }
}

/// Sampling and bounding parameters for a single generation call.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Validate)]
pub struct GenerationParams {
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    #[validate(range(min = 1))]
    pub max_output_tokens: u32,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_output_tokens: 1024,
            timeout_secs: 60,
        }
    }
}

/// Partial override of [`GenerationParams`] for one stage.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct GenerationOverrides {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl GenerationParams {
    pub fn with_overrides(self, overrides: &GenerationOverrides) -> Self {
        Self {
            temperature: overrides.temperature.unwrap_or(self.temperature),
            max_output_tokens: overrides.max_output_tokens.unwrap_or(self.max_output_tokens),
            timeout_secs: overrides.timeout_secs.unwrap_or(self.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let base = GenerationParams::default();
        let merged = base.with_overrides(&GenerationOverrides {
            temperature: Some(0.5),
            max_output_tokens: None,
            timeout_secs: Some(15),
        });
        assert_eq!(merged.temperature, 0.5);
        assert_eq!(merged.max_output_tokens, 1024);
        assert_eq!(merged.timeout_secs, 15);
    }

    #[test]
    fn test_params_validation_rejects_zero_timeout() {
        let params = GenerationParams {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        assert!(GenerationParams::default().validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(LLMConfig::default().validate().is_ok());
    }
}

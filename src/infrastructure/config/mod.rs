use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::use_cases::qa_report::steps::DEFAULT_ACTION_VERBS;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{GenerationOverrides, GenerationParams, LLMConfig, LLMProvider};
use crate::domain::stage::StageName;

pub const DEFAULT_CONFIG_FILE: &str = "brd-qa.toml";
pub const ENV_PREFIX: &str = "BRDQA_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub provider: LLMProvider,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Together,
            base_url: None,
            model: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSettings {
    pub action_verbs: Vec<String>,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            action_verbs: DEFAULT_ACTION_VERBS.iter().map(|verb| verb.to_string()).collect(),
        }
    }
}

/// Raw layered settings, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub generation: GenerationParams,
    #[serde(default)]
    pub stages: HashMap<String, GenerationOverrides>,
    #[serde(default)]
    pub steps: StepSettings,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            generation: GenerationParams::default(),
            stages: HashMap::new(),
            steps: StepSettings::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Validated configuration handed to the pipeline at construction time.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub llm: LLMConfig,
    pub generation: GenerationParams,
    pub stage_overrides: HashMap<StageName, GenerationOverrides>,
    pub action_verbs: Vec<String>,
    pub output_dir: PathBuf,
}

/// Defaults, then the TOML file, then `BRDQA_*` environment variables
/// (`__` separates nested keys, e.g. `BRDQA_LLM__MODEL`).
pub fn figment(config_file: &Path) -> Figment {
    Figment::from(Serialized::defaults(AppSettings::default()))
        .merge(Toml::file(config_file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads `.env`, then the layered settings, and validates them.
pub fn load_config(config_file: Option<&Path>) -> Result<PipelineConfig> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            tracing::warn!(error = %err, "failed to read .env file");
        }
    }

    let path = match config_file {
        Some(path) if !path.exists() => {
            return Err(AppError::ConfigError(format!(
                "Config file {} does not exist",
                path.display()
            )))
        }
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    let settings: AppSettings = figment(&path).extract()?;
    settings.resolve(|name| std::env::var(name).ok())
}

impl AppSettings {
    /// Validates the settings. `lookup_env` supplies the vendor key variable
    /// (e.g. `TOGETHER_API_KEY`) when no key is configured explicitly.
    pub fn resolve(self, lookup_env: impl Fn(&str) -> Option<String>) -> Result<PipelineConfig> {
        let provider = self.llm.provider;
        let api_key = self
            .llm
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| provider.api_key_env().and_then(|name| lookup_env(name)))
            .filter(|key| !key.trim().is_empty());

        let llm = LLMConfig {
            provider,
            base_url: self
                .llm
                .base_url
                .unwrap_or_else(|| provider.default_base_url().to_string()),
            model: self
                .llm
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
            api_key,
        };
        llm.validate()?;
        self.generation.validate()?;

        let mut stage_overrides = HashMap::new();
        for (name, overrides) in self.stages {
            let stage: StageName = name
                .parse()
                .map_err(|err: AppError| AppError::ConfigError(err.to_string()))?;
            self.generation.with_overrides(&overrides).validate()?;
            stage_overrides.insert(stage, overrides);
        }

        let action_verbs: Vec<String> = self
            .steps
            .action_verbs
            .into_iter()
            .map(|verb| verb.trim().to_string())
            .filter(|verb| !verb.is_empty())
            .collect();
        if action_verbs.is_empty() {
            return Err(AppError::ConfigError(
                "steps.action_verbs must list at least one verb".to_string(),
            ));
        }

        Ok(PipelineConfig {
            llm,
            generation: self.generation,
            stage_overrides,
            action_verbs,
            output_dir: self.output_dir,
        })
    }
}

use std::sync::Arc;
use std::time::Instant;

use super::prompts::build_stage_context;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::stage::{Stage, StageName, StageResult};
use crate::infrastructure::llm_clients::{CompletionRequest, LLMClient};

/// Runs a single stage: one bounded generation call, no retry.
pub struct StageExecutor {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl StageExecutor {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    pub async fn run_stage(
        &self,
        stage: &Stage,
        project_name: &str,
        context: &str,
    ) -> Result<StageResult> {
        let instructions = stage.render_instructions(project_name);
        let request = CompletionRequest {
            persona: &stage.persona,
            instructions: &instructions,
            context,
            params: stage.params,
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(
            stage.timeout(),
            self.llm_client.complete(&self.config, &request),
        )
        .await;

        let raw_output = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                return Err(AppError::StageFailed {
                    stage: stage.name.to_string(),
                    message: err.to_string(),
                })
            }
            Err(_) => {
                return Err(AppError::StageFailed {
                    stage: stage.name.to_string(),
                    message: format!("timed out after {}s", stage.params.timeout_secs),
                })
            }
        };

        Ok(StageResult {
            stage: stage.name,
            raw_output,
            produced_at: chrono::Utc::now(),
            elapsed_ms: started.elapsed().as_millis(),
        })
    }
}

/// Raw outputs of a completed run, in stage order.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub results: Vec<StageResult>,
}

impl PipelineRun {
    pub fn result(&self, stage: StageName) -> Option<&StageResult> {
        self.results.iter().find(|result| result.stage == stage)
    }

    /// Raw output looked up by its exact stage name. Unknown or missing names
    /// are logged rather than silently skipped.
    pub fn raw_output(&self, name: &str) -> Option<&str> {
        let stage = match name.parse::<StageName>() {
            Ok(stage) => stage,
            Err(err) => {
                tracing::warn!(error = %err, "stage output requested under an unknown name");
                return None;
            }
        };
        let found = self.result(stage).map(|result| result.raw_output.as_str());
        if found.is_none() {
            tracing::warn!(stage = %stage, "no output recorded for stage");
        }
        found
    }
}

/// The ordered five-stage QA pipeline.
pub struct QaPipeline {
    stages: Arc<[Stage]>,
    executor: StageExecutor,
}

impl QaPipeline {
    /// Fails unless `stages` holds each stage name exactly once, in order.
    pub fn new(stages: Vec<Stage>, executor: StageExecutor) -> Result<Self> {
        let names: Vec<StageName> = stages.iter().map(|stage| stage.name).collect();
        if names != StageName::ALL {
            return Err(AppError::ValidationError(format!(
                "Pipeline stages must be {:?} in order, got {:?}",
                StageName::ALL.map(|name| name.as_str()),
                names.iter().map(|name| name.as_str()).collect::<Vec<_>>()
            )));
        }
        Ok(Self {
            stages: stages.into(),
            executor,
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Runs every stage in order, each seeing the document plus all earlier
    /// outputs. The first failing stage aborts the run.
    pub async fn run(&self, project_name: &str, document_text: &str) -> Result<PipelineRun> {
        let mut results: Vec<StageResult> = Vec::with_capacity(self.stages.len());

        for stage in self.stages.iter() {
            let context = build_stage_context(document_text, &results);
            tracing::info!(
                stage = %stage.name,
                ordinal = stage.ordinal(),
                context_chars = context.len(),
                "running stage"
            );

            let result = self
                .executor
                .run_stage(stage, project_name, &context)
                .await
                .map_err(|err| {
                    tracing::error!(stage = %stage.name, error = %err, "stage failed; abandoning run");
                    err
                })?;

            tracing::info!(
                stage = %stage.name,
                elapsed_ms = result.elapsed_ms as u64,
                output_chars = result.raw_output.len(),
                "stage completed"
            );
            results.push(result);
        }

        Ok(PipelineRun { results })
    }
}

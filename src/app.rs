use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::application::use_cases::qa_report::assembler::ReportAssembler;
use crate::application::use_cases::qa_report::pipeline::QaPipeline;
use crate::application::use_cases::qa_report::prompts::default_stages;
use crate::application::use_cases::qa_report::steps::StepSegmenter;
use crate::application::use_cases::qa_report::{QaReportUseCase, StageExecutor};
use crate::domain::error::Result;
use crate::domain::report::ReportArtifact;
use crate::infrastructure::config::{load_config, PipelineConfig};
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use crate::infrastructure::pdf::load_document;

/// One report request as given on the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pdf: PathBuf,
    pub project: Option<String>,
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn build_use_case(
    config: PipelineConfig,
    llm_client: Arc<dyn LLMClient + Send + Sync>,
) -> Result<QaReportUseCase> {
    let stages = default_stages(config.generation, &config.stage_overrides);
    let executor = StageExecutor::new(llm_client, config.llm);
    let pipeline = QaPipeline::new(stages, executor)?;
    let assembler = ReportAssembler::new(StepSegmenter::with_verbs(&config.action_verbs)?);
    Ok(QaReportUseCase::new(pipeline, assembler, config.output_dir))
}

pub async fn run(options: RunOptions) -> Result<ReportArtifact> {
    let mut config = load_config(options.config.as_deref())?;
    if let Some(output_dir) = options.output_dir {
        config.output_dir = output_dir;
    }
    tracing::info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        output_dir = %config.output_dir.display(),
        "configuration loaded"
    );

    let document = load_document(&options.pdf)?;
    let project = options
        .project
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| document.name.clone());

    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::new());
    let use_case = build_use_case(config, llm_client)?;
    use_case.generate(&project, &document).await
}

pub mod assembler;
pub mod decoder;
mod literal;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod steps;

use std::path::PathBuf;

use crate::domain::document::Document;
use crate::domain::error::{AppError, Result};
use crate::domain::report::{Report, ReportArtifact, SheetKind};
use crate::infrastructure::report_writer::write_xlsx;
use crate::infrastructure::storage::{ensure_output_dir, report_file_name};

use assembler::ReportAssembler;
use decoder::decode;
use normalizer::normalize_list;
use pipeline::{PipelineRun, QaPipeline};

pub use pipeline::StageExecutor;

pub struct QaReportUseCase {
    pipeline: QaPipeline,
    assembler: ReportAssembler,
    output_dir: PathBuf,
}

impl QaReportUseCase {
    pub fn new(pipeline: QaPipeline, assembler: ReportAssembler, output_dir: PathBuf) -> Self {
        Self {
            pipeline,
            assembler,
            output_dir,
        }
    }

    /// Runs the five stages over `document` and writes the report workbook.
    /// Nothing is written unless every stage succeeds.
    pub async fn generate(&self, project_name: &str, document: &Document) -> Result<ReportArtifact> {
        if document.is_empty() {
            return Err(AppError::EmptyDocument(document.name.clone()));
        }

        tracing::info!(
            document = %document.name,
            project = %project_name,
            chars = document.text.len(),
            "generating QA report"
        );
        let run = self.pipeline.run(project_name, &document.text).await?;
        let report = self.build_report(&run);

        let dir = ensure_output_dir(&self.output_dir)?;
        let file_name = report_file_name(chrono::Local::now());
        let path = dir.join(&file_name);
        write_xlsx(&report, &path)?;

        let summary = report.summary();
        tracing::info!(
            path = %path.display(),
            modules = summary.modules,
            scenarios = summary.scenarios,
            test_cases = summary.test_cases,
            edge_cases = summary.edge_cases,
            automation_candidates = summary.automation_candidates,
            "QA report ready"
        );

        Ok(ReportArtifact {
            path,
            file_name,
            summary,
        })
    }

    /// Decodes and normalizes each stage output into its sheet.
    pub fn build_report(&self, run: &PipelineRun) -> Report {
        let [analysis, scenarios, testcases, edgecases, automation] =
            SheetKind::ALL.map(|kind| {
                run.raw_output(kind.source_stage().as_str())
                    .map(|raw| normalize_list(&decode(raw)))
                    .unwrap_or_default()
            });
        self.assembler
            .assemble(analysis, scenarios, testcases, edgecases, automation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm_config::{GenerationParams, LLMConfig};
    use crate::domain::stage::{StageName, StageResult};
    use crate::infrastructure::llm_clients::{CompletionRequest, LLMClient};
    use async_trait::async_trait;
    use calamine::{open_workbook, Reader, Xlsx};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    const ANALYSIS: &str = r#"<think>modules first</think>
```json
[{"module": "Login", "description": "User logs in with username and password"}]
```"#;
    const SCENARIOS: &str = r#"Here you go: [{"id": "TS1", "description": "Valid login"}, {"id": "TS2", "description": "Locked account"}] Hope that helps!"#;
    const TESTCASES: &str = r#"[{'id': 'TC1', 'scenario': 'Valid login', 'steps': ['Enter username', 'Click submit'], 'expected_result': 'Dashboard shown', 'test_type': 'Positive'}]"#;
    const EDGE_CASES: &str = r#"["[{\"id\": \"EC1\", \"scenario\": \"Empty password\"}, {\"id\": \"EC2\", \"scenario\": \"SQL in username\"}]"]"#;
    const AUTOMATION: &str = r#"["Automate the login smoke test."]"#;

    struct CannedClient {
        calls: Mutex<usize>,
        fail_on_call: Option<usize>,
    }

    impl CannedClient {
        fn new(fail_on_call: Option<usize>) -> Self {
            Self {
                calls: Mutex::new(0),
                fail_on_call,
            }
        }
    }

    #[async_trait]
    impl LLMClient for CannedClient {
        async fn complete(&self, _config: &LLMConfig, _request: &CompletionRequest<'_>) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            let call = *calls;
            *calls += 1;
            if self.fail_on_call == Some(call) {
                return Err(AppError::LLMError("API error (429): quota exceeded".to_string()));
            }
            let canned = [ANALYSIS, SCENARIOS, TESTCASES, EDGE_CASES, AUTOMATION];
            Ok(canned[call].to_string())
        }
    }

    fn use_case(client: Arc<CannedClient>, output_dir: PathBuf) -> QaReportUseCase {
        let stages = prompts::default_stages(GenerationParams::default(), &HashMap::new());
        let executor = StageExecutor::new(client, LLMConfig::default());
        let pipeline = QaPipeline::new(stages, executor).unwrap();
        QaReportUseCase::new(pipeline, ReportAssembler::default(), output_dir)
    }

    fn rows(path: &std::path::Path, sheet: &str) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        workbook
            .worksheet_range(sheet)
            .unwrap()
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_generate_writes_five_sheet_report() {
        let dir = tempdir().unwrap();
        let use_case = use_case(Arc::new(CannedClient::new(None)), dir.path().join("out"));
        let document = Document::new("login_brd.pdf", "Users log in with username and password.");

        let artifact = use_case.generate("Banking Login", &document).await.unwrap();

        assert!(artifact.path.exists());
        assert!(artifact.file_name.starts_with("QA_Report_"));
        assert_eq!(artifact.summary.modules, 1);
        assert_eq!(artifact.summary.scenarios, 2);
        assert_eq!(artifact.summary.test_cases, 1);
        assert_eq!(artifact.summary.edge_cases, 2);
        assert_eq!(artifact.summary.automation_candidates, 1);

        let cases = rows(&artifact.path, "Detailed Test Cases");
        assert_eq!(cases[1][0], "TC1");
        assert_eq!(cases[1][2], "1. Enter username\n2. Click submit");

        let automation = rows(&artifact.path, "Automation Candidates");
        assert_eq!(automation[1][0], "");
        assert_eq!(automation[1][1], "Automate the login smoke test.");
    }

    #[tokio::test]
    async fn test_failing_stage_writes_no_report() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("out");
        let client = Arc::new(CannedClient::new(Some(2)));
        let use_case = use_case(client.clone(), output_dir.clone());
        let document = Document::new("login_brd.pdf", "Users log in.");

        let err = use_case.generate("Banking Login", &document).await.unwrap_err();

        assert!(matches!(err, AppError::StageFailed { ref stage, .. } if stage == "detailed_testcases"));
        assert_eq!(*client.calls.lock().unwrap(), 3);
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn test_empty_document_skips_pipeline() {
        let dir = tempdir().unwrap();
        let client = Arc::new(CannedClient::new(None));
        let use_case = use_case(client.clone(), dir.path().to_path_buf());

        let err = use_case
            .generate("Banking Login", &Document::new("scan.pdf", "  \n "))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmptyDocument(ref name) if name == "scan.pdf"));
        assert_eq!(*client.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_missing_stage_output_yields_header_only_sheet() {
        let dir = tempdir().unwrap();
        let use_case = use_case(Arc::new(CannedClient::new(None)), dir.path().to_path_buf());
        let run = PipelineRun {
            results: vec![StageResult {
                stage: StageName::TestScenarios,
                raw_output: SCENARIOS.to_string(),
                produced_at: chrono::Utc::now(),
                elapsed_ms: 0,
            }],
        };

        let report = use_case.build_report(&run);

        assert_eq!(report.sheets.len(), 5);
        let summary = report.summary();
        assert_eq!(summary.scenarios, 2);
        assert_eq!(summary.modules, 0);
        assert_eq!(summary.test_cases, 0);
    }
}

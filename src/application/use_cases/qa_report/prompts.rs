use std::collections::HashMap;

use crate::domain::llm_config::{GenerationOverrides, GenerationParams};
use crate::domain::stage::{Stage, StageName, StageResult};

const LEAD_QA: &str = "You are a Lead QA Analyst with fifteen years of experience in banking and enterprise software. You read business requirements critically, break them into testable functional modules and flag anything ambiguous.";

const SCENARIO_DESIGNER: &str = "You are a QA Test Scenario Designer. You turn analysed requirements into concise, end-to-end test scenarios covering positive, negative and boundary behaviour.";

const TESTCASE_WRITER: &str = "You are a Senior Test Case Writer. You expand test scenarios into detailed, executable manual test cases with explicit steps and observable expected results.";

const QA_REVIEWER: &str = "You are a QA Reviewer responsible for test coverage. You look for gaps, edge cases and the cases that give the best return when automated.";

const JSON_ONLY: &str = "Return ONLY a JSON array. Do not wrap it in markdown and do not add any explanation before or after it.";

fn instructions_for(name: StageName) -> String {
    let body = match name {
        StageName::BrdAnalysis => {
            "Analyse the Business Requirements Document for the project \"{project_name}\". Identify every functional module or feature area it describes. Each array item must be an object with keys: \"module\" (short module name) and \"description\" (what the module must do, including rules and limits stated in the BRD)."
        }
        StageName::TestScenarios => {
            "Using the BRD and the module analysis for \"{project_name}\", design high-level test scenarios. Each array item must be an object with keys: \"id\" (e.g. \"TS01\") and \"description\" (one sentence stating what is being verified)."
        }
        StageName::DetailedTestcases => {
            "Write detailed test cases for \"{project_name}\" covering every scenario above. Each array item must be an object with keys: \"id\" (e.g. \"TC01\"), \"scenario\" (the scenario it covers), \"steps\" (an array of short imperative steps such as \"Enter username\", \"Click Login\"), \"expected_result\" and \"test_type\" (Positive, Negative or Boundary)."
        }
        StageName::EdgeCaseReview => {
            "Review the test cases for \"{project_name}\" and list edge cases that are not yet covered: invalid input, limits, concurrency, timeouts, lockouts and unusual user behaviour. Each array item must be an object with keys: \"id\" (e.g. \"EC01\"), \"scenario\", \"steps\" (array of short imperative steps) and \"expected_result\"."
        }
        StageName::AutomationCandidates => {
            "From the test cases and edge cases for \"{project_name}\", pick the ones that should be automated first. Each array item must be an object with keys: \"id\" (the test case or edge case id) and \"reason\" (why automating it pays off)."
        }
    };
    format!("{}\n\n{}", body, JSON_ONLY)
}

fn persona_for(name: StageName) -> &'static str {
    match name {
        StageName::BrdAnalysis => LEAD_QA,
        StageName::TestScenarios => SCENARIO_DESIGNER,
        StageName::DetailedTestcases => TESTCASE_WRITER,
        StageName::EdgeCaseReview | StageName::AutomationCandidates => QA_REVIEWER,
    }
}

/// The five QA stages in pipeline order, each with `defaults` adjusted by any
/// per-stage override.
pub fn default_stages(
    defaults: GenerationParams,
    overrides: &HashMap<StageName, GenerationOverrides>,
) -> Vec<Stage> {
    StageName::ALL
        .into_iter()
        .map(|name| Stage {
            name,
            persona: persona_for(name).to_string(),
            instructions: instructions_for(name),
            params: overrides
                .get(&name)
                .map(|o| defaults.with_overrides(o))
                .unwrap_or(defaults),
        })
        .collect()
}

/// Context handed to a stage: the document followed by every earlier
/// stage's raw output, oldest first.
pub fn build_stage_context(document_text: &str, prior: &[StageResult]) -> String {
    let mut body = String::new();
    body.push_str("Business Requirements Document:\n");
    body.push_str(document_text.trim());
    body.push('\n');

    for result in prior {
        body.push_str(&format!("\nOutput of stage {}:\n", result.stage));
        body.push_str(result.raw_output.trim());
        body.push('\n');
    }

    body
}

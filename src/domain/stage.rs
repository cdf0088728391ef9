use crate::domain::error::AppError;
use crate::domain::llm_config::GenerationParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    BrdAnalysis,
    TestScenarios,
    DetailedTestcases,
    EdgeCaseReview,
    AutomationCandidates,
}

impl StageName {
    /// Pipeline order.
    pub const ALL: [StageName; 5] = [
        StageName::BrdAnalysis,
        StageName::TestScenarios,
        StageName::DetailedTestcases,
        StageName::EdgeCaseReview,
        StageName::AutomationCandidates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::BrdAnalysis => "brd_analysis",
            StageName::TestScenarios => "test_scenarios",
            StageName::DetailedTestcases => "detailed_testcases",
            StageName::EdgeCaseReview => "edge_case_review",
            StageName::AutomationCandidates => "automation_candidates",
        }
    }

    pub fn ordinal(&self) -> usize {
        match self {
            StageName::BrdAnalysis => 0,
            StageName::TestScenarios => 1,
            StageName::DetailedTestcases => 2,
            StageName::EdgeCaseReview => 3,
            StageName::AutomationCandidates => 4,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact-match only. Near misses such as `edge_cases` are rejected.
impl FromStr for StageName {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        StageName::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Unknown stage name '{}'; expected one of: {}",
                    value,
                    StageName::ALL.map(|name| name.as_str()).join(", ")
                ))
            })
    }
}

/// One pipeline step: a persona, its instruction template and its call limits.
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    pub name: StageName,
    pub persona: String,
    pub instructions: String,
    pub params: GenerationParams,
}

impl Stage {
    pub fn ordinal(&self) -> usize {
        self.name.ordinal()
    }

    pub fn render_instructions(&self, project_name: &str) -> String {
        self.instructions.replace("{project_name}", project_name)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.params.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    pub stage: StageName,
    pub raw_output: String,
    pub produced_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_parse_exactly() {
        for name in StageName::ALL {
            assert_eq!(name.as_str().parse::<StageName>().unwrap(), name);
        }
        assert!("edge_cases".parse::<StageName>().is_err());
        assert!("BRD_ANALYSIS".parse::<StageName>().is_err());
    }

    #[test]
    fn test_ordinals_follow_pipeline_order() {
        for (index, name) in StageName::ALL.iter().enumerate() {
            assert_eq!(name.ordinal(), index);
        }
    }

    #[test]
    fn test_render_instructions_interpolates_project() {
        let stage = Stage {
            name: StageName::BrdAnalysis,
            persona: "Lead QA".to_string(),
            instructions: "Analyse the BRD for {project_name}.".to_string(),
            params: GenerationParams::default(),
        };
        assert_eq!(
            stage.render_instructions("Banking Login"),
            "Analyse the BRD for Banking Login."
        );
    }
}

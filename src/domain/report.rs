use crate::domain::stage::StageName;
use serde::Serialize;

/// The five fixed sheets of a QA report, in workbook order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SheetKind {
    BrdAnalysis,
    TestScenarios,
    DetailedTestCases,
    EdgeCases,
    AutomationCandidates,
}

impl SheetKind {
    pub const ALL: [SheetKind; 5] = [
        SheetKind::BrdAnalysis,
        SheetKind::TestScenarios,
        SheetKind::DetailedTestCases,
        SheetKind::EdgeCases,
        SheetKind::AutomationCandidates,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SheetKind::BrdAnalysis => "BRD Analysis",
            SheetKind::TestScenarios => "Test Scenarios",
            SheetKind::DetailedTestCases => "Detailed Test Cases",
            SheetKind::EdgeCases => "Edge Cases",
            SheetKind::AutomationCandidates => "Automation Candidates",
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            SheetKind::BrdAnalysis => &["Module", "Description"],
            SheetKind::TestScenarios => &["ID", "Description"],
            SheetKind::DetailedTestCases => &["ID", "Scenario", "Steps", "Expected Result", "Type"],
            SheetKind::EdgeCases => &["ID", "Scenario", "Steps", "Expected Result"],
            SheetKind::AutomationCandidates => &["ID", "Reason"],
        }
    }

    /// Record keys read for each column, aligned with [`SheetKind::headers`].
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            SheetKind::BrdAnalysis => &["module", "description"],
            SheetKind::TestScenarios => &["id", "description"],
            SheetKind::DetailedTestCases => {
                &["id", "scenario", "steps", "expected_result", "test_type"]
            }
            SheetKind::EdgeCases => &["id", "scenario", "steps", "expected_result"],
            SheetKind::AutomationCandidates => &["id", "reason"],
        }
    }

    pub fn source_stage(&self) -> StageName {
        match self {
            SheetKind::BrdAnalysis => StageName::BrdAnalysis,
            SheetKind::TestScenarios => StageName::TestScenarios,
            SheetKind::DetailedTestCases => StageName::DetailedTestcases,
            SheetKind::EdgeCases => StageName::EdgeCaseReview,
            SheetKind::AutomationCandidates => StageName::AutomationCandidates,
        }
    }

    /// Sheets whose items may arrive as a JSON array encoded inside a string.
    pub fn splices_encoded_lists(&self) -> bool {
        matches!(self, SheetKind::BrdAnalysis | SheetKind::EdgeCases)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub kind: SheetKind,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(kind: SheetKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn headers(&self) -> &'static [&'static str] {
        self.kind.headers()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sheets: Vec<Sheet>,
}

impl Report {
    pub fn sheet(&self, kind: SheetKind) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.kind == kind)
    }

    pub fn summary(&self) -> ReportSummary {
        let count = |kind| self.sheet(kind).map(|sheet| sheet.rows.len()).unwrap_or(0);
        ReportSummary {
            modules: count(SheetKind::BrdAnalysis),
            scenarios: count(SheetKind::TestScenarios),
            test_cases: count(SheetKind::DetailedTestCases),
            edge_cases: count(SheetKind::EdgeCases),
            automation_candidates: count(SheetKind::AutomationCandidates),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub modules: usize,
    pub scenarios: usize,
    pub test_cases: usize,
    pub edge_cases: usize,
    pub automation_candidates: usize,
}

/// A report written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ReportArtifact {
    pub path: std::path::PathBuf,
    pub file_name: String,
    pub summary: ReportSummary,
}

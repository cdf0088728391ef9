pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::use_cases::qa_report::QaReportUseCase;
pub use domain::error::{AppError, Result};
pub use domain::report::{Report, ReportArtifact, ReportSummary};

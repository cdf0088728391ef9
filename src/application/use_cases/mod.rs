pub mod qa_report;

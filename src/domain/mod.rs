pub mod document;
pub mod error;
pub mod llm_config;
pub mod report;
pub mod stage;

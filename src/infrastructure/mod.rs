pub mod config;
pub mod llm_clients;
pub mod pdf;
pub mod report_writer;
pub mod response;
pub mod storage;

//! Error types for the reporting stage

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("LLM error: {0}")]
    Llm(#[from] memo_llm::LLMError),
}

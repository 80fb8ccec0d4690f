use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("neither extracted text nor an image is available to analyze")]
    Empty,

    #[error(transparent)]
    Llm(#[from] amtbrief_llm::LlmError),
}

impl From<AnalysisError> for amtbrief_core::ApiError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::Empty => amtbrief_core::ApiError::AnalysisEmpty,
            AnalysisError::Llm(inner) => inner.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

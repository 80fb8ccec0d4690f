use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no LLM provider is available")]
    NoProviderAvailable,

    #[error("LLM provider key is invalid")]
    KeyInvalid,

    #[error("LLM provider is rate limiting requests")]
    RateLimited,

    #[error("LLM provider returned an upstream error")]
    UpstreamError,

    #[error("LLM call timed out")]
    Timeout,
}

impl From<LlmError> for amtbrief_core::ApiError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::NoProviderAvailable => amtbrief_core::ApiError::NoLLMAvailable,
            LlmError::KeyInvalid => amtbrief_core::ApiError::LLMKeyInvalid,
            LlmError::RateLimited => amtbrief_core::ApiError::LLMRateLimited,
            LlmError::UpstreamError => amtbrief_core::ApiError::LLMUpstreamError,
            LlmError::Timeout => amtbrief_core::ApiError::LLMTimeout,
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;

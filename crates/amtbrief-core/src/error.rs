use thiserror::Error;

/// Unified error taxonomy for the whole pipeline.
///
/// Every component-level error type in this workspace (`amtbrief-identity`,
/// `amtbrief-users`, `amtbrief-ocr`, `amtbrief-llm`, `amtbrief-analysis`,
/// `amtbrief-letters`) ultimately converts into one of these variants so the
/// gateway has a single place that maps errors to HTTP status codes and
/// JSON bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication is not configured for this provider")]
    AuthUnconfigured,

    #[error("invalid authentication payload")]
    AuthInvalidPayload,

    #[error("authentication was rejected")]
    AuthRejected,

    #[error("authentication required")]
    Unauthenticated,

    #[error("upload exceeds the maximum accepted size")]
    InputTooLarge,

    #[error("unsupported file type")]
    UnsupportedMime,

    #[error("could not decode the uploaded file")]
    DecodeFailed,

    #[error("template is missing a required variable: {0}")]
    TemplateVariableMissing(String),

    #[error("the OCR binary is not installed")]
    OcrBinaryMissing,

    #[error("OCR timed out")]
    OcrTimeout,

    #[error("no LLM provider is available")]
    NoLLMAvailable,

    #[error("LLM provider key is invalid")]
    LLMKeyInvalid,

    #[error("LLM provider is rate limiting requests")]
    LLMRateLimited,

    #[error("LLM provider returned an upstream error")]
    LLMUpstreamError,

    #[error("LLM call timed out")]
    LLMTimeout,

    #[error("neither extracted text nor an image is available to analyze")]
    AnalysisEmpty,

    #[error("analysis exceeded the end-to-end time budget")]
    AnalysisTimeout,

    #[error("{0} not found")]
    NotFound(String),

    #[error("conflicting update")]
    ConflictingUpdate,

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The `error_kind` string carried in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::AuthUnconfigured => "AuthUnconfigured",
            ApiError::AuthInvalidPayload => "AuthInvalidPayload",
            ApiError::AuthRejected => "AuthRejected",
            ApiError::Unauthenticated => "Unauthenticated",
            ApiError::InputTooLarge => "InputTooLarge",
            ApiError::UnsupportedMime => "UnsupportedMime",
            ApiError::DecodeFailed => "DecodeFailed",
            ApiError::TemplateVariableMissing(_) => "TemplateVariableMissing",
            ApiError::OcrBinaryMissing => "OcrBinaryMissing",
            ApiError::OcrTimeout => "OcrTimeout",
            ApiError::NoLLMAvailable => "NoLLMAvailable",
            ApiError::LLMKeyInvalid => "LLMKeyInvalid",
            ApiError::LLMRateLimited => "LLMRateLimited",
            ApiError::LLMUpstreamError => "LLMUpstreamError",
            ApiError::LLMTimeout => "LLMTimeout",
            ApiError::AnalysisEmpty => "AnalysisEmpty",
            ApiError::AnalysisTimeout => "AnalysisTimeout",
            ApiError::NotFound(_) => "NotFound",
            ApiError::ConflictingUpdate => "ConflictingUpdate",
            ApiError::Database(_) => "Database",
            ApiError::Config(_) => "Config",
            ApiError::Internal(_) => "Internal",
        }
    }

    /// HTTP status code for the gateway's error-response mapping.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::InputTooLarge => 413,
            ApiError::UnsupportedMime
            | ApiError::DecodeFailed
            | ApiError::TemplateVariableMissing(_) => 400,
            ApiError::AuthUnconfigured
            | ApiError::AuthInvalidPayload
            | ApiError::AuthRejected
            | ApiError::Unauthenticated => 401,
            ApiError::LLMRateLimited => 429,
            ApiError::OcrTimeout | ApiError::LLMTimeout | ApiError::AnalysisTimeout => 504,
            ApiError::LLMUpstreamError | ApiError::NoLLMAvailable | ApiError::LLMKeyInvalid => 502,
            ApiError::AnalysisEmpty => 400,
            ApiError::NotFound(_) => 404,
            ApiError::ConflictingUpdate => 409,
            ApiError::OcrBinaryMissing | ApiError::Database(_) | ApiError::Config(_) | ApiError::Internal(_) => 500,
        }
    }

    /// Whether a client may reasonably retry the same request unchanged.
    pub fn retriable(&self) -> bool {
        matches!(
            self,
            ApiError::LLMRateLimited
                | ApiError::OcrTimeout
                | ApiError::LLMTimeout
                | ApiError::AnalysisTimeout
                | ApiError::LLMUpstreamError
        )
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("upload exceeds the maximum accepted size")]
    InputTooLarge,

    #[error("unsupported MIME type: {0}")]
    UnsupportedMime(String),

    #[error("could not decode the uploaded file: {0}")]
    DecodeFailed(String),

    #[error("the OCR binary is not installed at {0}")]
    OcrBinaryMissing(String),

    #[error("OCR timed out")]
    Timeout,
}

impl From<OcrError> for amtbrief_core::ApiError {
    fn from(e: OcrError) -> Self {
        match e {
            OcrError::InputTooLarge => amtbrief_core::ApiError::InputTooLarge,
            OcrError::UnsupportedMime(_) => amtbrief_core::ApiError::UnsupportedMime,
            OcrError::DecodeFailed(_) => amtbrief_core::ApiError::DecodeFailed,
            OcrError::OcrBinaryMissing(_) => amtbrief_core::ApiError::OcrBinaryMissing,
            OcrError::Timeout => amtbrief_core::ApiError::OcrTimeout,
        }
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("authentication is not configured for this provider")]
    Unconfigured,

    #[error("invalid authentication payload: {0}")]
    InvalidPayload(String),

    #[error("authentication was rejected: {0}")]
    Rejected(String),
}

impl From<IdentityError> for amtbrief_core::ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Unconfigured => amtbrief_core::ApiError::AuthUnconfigured,
            IdentityError::InvalidPayload(_) => amtbrief_core::ApiError::AuthInvalidPayload,
            IdentityError::Rejected(_) => amtbrief_core::ApiError::AuthRejected,
        }
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;

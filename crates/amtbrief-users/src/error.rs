use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("conflicting update for {0}")]
    ConflictingUpdate(String),
}

impl From<UserError> for amtbrief_core::ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(id) => amtbrief_core::ApiError::NotFound(id),
            UserError::DatabaseError(err) => amtbrief_core::ApiError::Database(err.to_string()),
            UserError::ConflictingUpdate(_) => amtbrief_core::ApiError::ConflictingUpdate,
        }
    }
}

pub type Result<T> = std::result::Result<T, UserError>;

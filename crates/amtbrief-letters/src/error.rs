use thiserror::Error;

#[derive(Debug, Error)]
pub enum LetterError {
    #[error("template is missing a required variable: {0}")]
    TemplateVariableMissing(String),

    #[error("unknown letter template: {0}/{1}")]
    UnknownTemplate(String, String),

    #[error(transparent)]
    Llm(#[from] amtbrief_llm::LlmError),

    #[error(transparent)]
    User(#[from] amtbrief_users::UserError),
}

impl From<LetterError> for amtbrief_core::ApiError {
    fn from(e: LetterError) -> Self {
        match e {
            LetterError::TemplateVariableMissing(v) => {
                amtbrief_core::ApiError::TemplateVariableMissing(v)
            }
            LetterError::UnknownTemplate(cat, key) => {
                amtbrief_core::ApiError::NotFound(format!("letter template {cat}/{key}"))
            }
            LetterError::Llm(inner) => inner.into(),
            LetterError::User(inner) => inner.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LetterError>;

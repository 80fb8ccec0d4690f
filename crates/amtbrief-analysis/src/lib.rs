pub mod error;
pub mod formatter;
pub mod prompt;
pub mod sections;

use amtbrief_core::types::{Language, ProviderFamily};
use amtbrief_llm::{ImagePart, Router, SystemKeys, UserKeys};

pub use error::AnalysisError;
pub use formatter::AnalysisSections;

const MAX_TOKENS: u32 = 2048;

pub struct AnalysisOutcome {
    pub sections: AnalysisSections,
    pub full_text: String,
    pub provider_used: ProviderFamily,
    pub model_used: String,
    pub extracted_text_length: usize,
}

/// The Analysis Formatter: builds the prompt, calls the Router, cleans
/// and splits the answer into the nine named sections.
///
/// A scanned-only upload (no extractable text, no image to fall back to)
/// is not an error: the prompt tells the model no text or image is
/// available, and the resulting sections explain that nothing could be
/// extracted. `AnalysisError::Empty` is reserved for callers with no
/// upload at all, which never reach this function.
pub async fn analyze(
    router: &Router,
    extracted_text: &str,
    image: Option<ImagePart>,
    language: Language,
    user_keys: &UserKeys,
    system_keys: &SystemKeys,
) -> error::Result<AnalysisOutcome> {
    let extracted_text_length = extracted_text.trim().len();

    let image_attached = image.is_some();
    let (system, user_prompt) = prompt::build_prompt(language, extracted_text, image_attached);

    let req = amtbrief_llm::GenerateRequest {
        prompt: user_prompt,
        system,
        image,
        preferred_provider: None,
        max_tokens: MAX_TOKENS,
        temperature: None,
    };

    let outcome = router.generate(req, user_keys, system_keys).await?;

    let cleaned = formatter::strip_formatting(&outcome.text);
    let sections = formatter::split_sections(&cleaned, language);
    let full_text = sections.full_text();

    Ok(AnalysisOutcome {
        sections,
        full_text,
        provider_used: outcome.provider_used,
        model_used: outcome.model_used,
        extracted_text_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_text_and_no_image_still_calls_the_llm() {
        let router = Router::new();
        let user_keys = UserKeys { slots: [None, None, None] };
        let system_keys = SystemKeys::default();

        let result = analyze(&router, "", None, Language::En, &user_keys, &system_keys).await;
        assert!(matches!(result, Err(AnalysisError::Llm(_))));
    }

    #[tokio::test]
    async fn no_providers_available_surfaces_llm_error() {
        let router = Router::new();
        let user_keys = UserKeys { slots: [None, None, None] };
        let system_keys = SystemKeys::default();

        let result = analyze(&router, "Some extracted text", None, Language::En, &user_keys, &system_keys).await;
        assert!(matches!(result, Err(AnalysisError::Llm(_))));
    }
}

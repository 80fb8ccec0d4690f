pub mod error;
pub mod templates;

use std::collections::HashMap;
use std::sync::Arc;

use amtbrief_core::types::Language;
use amtbrief_llm::{GenerateRequest, Router, SystemKeys, UserKeys};
use amtbrief_users::{LetterRecord, UserStore};

pub use error::LetterError;

const POLISH_MAX_TOKENS: u32 = 1024;
const TRANSLATE_MAX_TOKENS: u32 = 1024;

pub struct ComposedLetter {
    pub subject: String,
    pub body_de: String,
    pub body_translation: Option<String>,
}

/// Template path: substitute variables, ask the Router to lightly polish
/// the German, translate if the target language isn't German.
pub async fn compose_from_template(
    router: &Router,
    category: &str,
    template_key: &str,
    variables: &HashMap<String, String>,
    target_language: Language,
    user_keys: &UserKeys,
    system_keys: &SystemKeys,
) -> error::Result<ComposedLetter> {
    let template = templates::find(category, template_key)
        .ok_or_else(|| LetterError::UnknownTemplate(category.to_string(), template_key.to_string()))?;

    let subject = templates::substitute(template.subject_template, &[], variables)
        .map_err(LetterError::TemplateVariableMissing)?;
    let draft_body = templates::substitute(template.body_template, template.required_variables, variables)
        .map_err(LetterError::TemplateVariableMissing)?;

    let polished = polish_german(router, &draft_body, user_keys, system_keys).await?;
    let body_translation = translate_if_needed(router, &polished, target_language, user_keys, system_keys).await?;

    Ok(ComposedLetter {
        subject,
        body_de: polished,
        body_translation,
    })
}

/// Free path: draft a formal German letter from a free-text prompt, then
/// translate if needed.
pub async fn compose_from_prompt(
    router: &Router,
    user_prompt: &str,
    target_language: Language,
    user_keys: &UserKeys,
    system_keys: &SystemKeys,
) -> error::Result<ComposedLetter> {
    let system = "You draft formal, polite German business letters (Sie-form). \
                  Produce only the letter body in German, no markdown formatting, \
                  no commentary."
        .to_string();

    let req = GenerateRequest {
        prompt: user_prompt.to_string(),
        system,
        image: None,
        preferred_provider: None,
        max_tokens: POLISH_MAX_TOKENS,
        temperature: None,
    };
    let outcome = router.generate(req, user_keys, system_keys).await?;
    let body_de = outcome.text.trim().to_string();

    let subject = derive_subject(&body_de);
    let body_translation = translate_if_needed(router, &body_de, target_language, user_keys, system_keys).await?;

    Ok(ComposedLetter {
        subject,
        body_de,
        body_translation,
    })
}

async fn polish_german(
    router: &Router,
    draft: &str,
    user_keys: &UserKeys,
    system_keys: &SystemKeys,
) -> error::Result<String> {
    let system = "You lightly polish German business letters for grammar and tone \
                  without changing their meaning, facts, or structure. Return only \
                  the polished letter body, nothing else."
        .to_string();

    let req = GenerateRequest {
        prompt: draft.to_string(),
        system,
        image: None,
        preferred_provider: None,
        max_tokens: POLISH_MAX_TOKENS,
        temperature: None,
    };
    let outcome = router.generate(req, user_keys, system_keys).await?;
    Ok(outcome.text.trim().to_string())
}

async fn translate_if_needed(
    router: &Router,
    body_de: &str,
    target_language: Language,
    user_keys: &UserKeys,
    system_keys: &SystemKeys,
) -> error::Result<Option<String>> {
    if target_language == Language::De {
        return Ok(None);
    }

    let system = format!(
        "You translate formal German letters into {} faithfully, preserving \
         meaning and tone, without adding or omitting information.",
        target_language.as_str()
    );

    let req = GenerateRequest {
        prompt: body_de.to_string(),
        system,
        image: None,
        preferred_provider: None,
        max_tokens: TRANSLATE_MAX_TOKENS,
        temperature: None,
    };
    let outcome = router.generate(req, user_keys, system_keys).await?;
    Ok(Some(outcome.text.trim().to_string()))
}

fn derive_subject(body_de: &str) -> String {
    body_de
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("Schreiben")
        .trim()
        .chars()
        .take(80)
        .collect()
}

/// Persistence is optional and explicit.
pub async fn save_letter(
    store: &Arc<UserStore>,
    user_id: &str,
    recipient_category: &str,
    template_key: Option<&str>,
    letter: &ComposedLetter,
    variables_snapshot: serde_json::Value,
) -> error::Result<LetterRecord> {
    let record = LetterRecord {
        id: String::new(),
        user_id: user_id.to_string(),
        recipient_category: recipient_category.to_string(),
        template_key: template_key.map(String::from),
        subject: letter.subject.clone(),
        body_de: letter.body_de.clone(),
        body_translation: letter.body_translation.clone(),
        variables_snapshot,
        created_at: amtbrief_core::types::now_rfc3339(),
    };
    Ok(store.append_letter(record).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_subject_uses_first_non_empty_line() {
        let subject = derive_subject("\n\nSehr geehrte Damen und Herren,\nich schreibe...");
        assert_eq!(subject, "Sehr geehrte Damen und Herren,");
    }

    #[tokio::test]
    async fn compose_from_template_rejects_unknown_template() {
        let router = Router::new();
        let user_keys = UserKeys { slots: [None, None, None] };
        let system_keys = SystemKeys::default();
        let variables = HashMap::new();

        let result = compose_from_template(
            &router,
            "landlord",
            "does_not_exist",
            &variables,
            Language::De,
            &user_keys,
            &system_keys,
        )
        .await;

        assert!(matches!(result, Err(LetterError::UnknownTemplate(_, _))));
    }

    #[tokio::test]
    async fn compose_from_template_reports_missing_variable() {
        let router = Router::new();
        let user_keys = UserKeys { slots: [None, None, None] };
        let system_keys = SystemKeys::default();
        let variables = HashMap::new();

        let result = compose_from_template(
            &router,
            "employer",
            "sick_leave_notice",
            &variables,
            Language::De,
            &user_keys,
            &system_keys,
        )
        .await;

        assert!(matches!(result, Err(LetterError::TemplateVariableMissing(_))));
    }
}

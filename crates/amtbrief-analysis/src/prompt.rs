use amtbrief_core::types::Language;

use crate::sections::{heading_label, SECTION_KEYS};

/// Builds the single prompt template parameterized by target language,
/// extracted text (may be empty), and whether an image is attached.
pub fn build_prompt(language: Language, extracted_text: &str, image_attached: bool) -> (String, String) {
    let system = system_prompt(language);

    let source = if extracted_text.trim().is_empty() && image_attached {
        "No text could be extracted mechanically; read the attached image directly.".to_string()
    } else if extracted_text.trim().is_empty() {
        "No text or image is available.".to_string()
    } else {
        format!("Extracted document text:\n\n{extracted_text}")
    };

    let user = format!(
        "{source}\n\nWrite your answer in {}. Produce exactly these sections, in this order, each starting on its own line with the heading shown, followed by a colon:\n{}",
        language.as_str(),
        headings_list(language),
    );

    (system, user)
}

fn headings_list(language: Language) -> String {
    SECTION_KEYS
        .iter()
        .map(|key| format!("- {}", heading_label(key, language)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn system_prompt(language: Language) -> String {
    format!(
        "You analyze official correspondence (letters from government offices, \
         utilities, insurers, courts) for a layperson who may not be fluent in \
         the document's original language. Respond only in {lang}. Do not use \
         markdown formatting symbols such as '*', '#', or backticks, and do not \
         use bullet glyphs — write plain sentences and plain lists using dashes. \
         For the urgency section, answer with exactly one of: low, medium, high, critical.",
        lang = language.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_with_image_instructs_reading_the_image() {
        let (_, user) = build_prompt(Language::En, "", true);
        assert!(user.contains("read the attached image directly"));
    }

    #[test]
    fn prompt_lists_all_nine_headings() {
        let (_, user) = build_prompt(Language::De, "Sehr geehrte Damen und Herren", false);
        for key in SECTION_KEYS {
            assert!(user.contains(heading_label(key, Language::De)));
        }
    }
}

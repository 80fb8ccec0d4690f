use amtbrief_core::types::Language;

/// The nine named sections, in fixed order.
pub const SECTION_KEYS: [&str; 9] = [
    "summary",
    "sender_info",
    "document_type",
    "key_content",
    "required_actions",
    "deadlines",
    "consequences",
    "urgency_level",
    "response_template",
];

/// Localized heading labels the model is instructed to emit, used both to
/// build the prompt and to split the model's answer back into sections.
pub fn heading_label(key: &str, language: Language) -> &'static str {
    match (key, language) {
        ("summary", Language::En) => "Summary",
        ("summary", Language::Ru) => "Резюме",
        ("summary", Language::De) => "Zusammenfassung",
        ("summary", Language::Uk) => "Резюме",

        ("sender_info", Language::En) => "Sender",
        ("sender_info", Language::Ru) => "Отправитель",
        ("sender_info", Language::De) => "Absender",
        ("sender_info", Language::Uk) => "Відправник",

        ("document_type", Language::En) => "Document type",
        ("document_type", Language::Ru) => "Тип документа",
        ("document_type", Language::De) => "Dokumentart",
        ("document_type", Language::Uk) => "Тип документа",

        ("key_content", Language::En) => "Key content",
        ("key_content", Language::Ru) => "Основное содержание",
        ("key_content", Language::De) => "Wesentlicher Inhalt",
        ("key_content", Language::Uk) => "Основний зміст",

        ("required_actions", Language::En) => "Required actions",
        ("required_actions", Language::Ru) => "Необходимые действия",
        ("required_actions", Language::De) => "Erforderliche Maßnahmen",
        ("required_actions", Language::Uk) => "Необхідні дії",

        ("deadlines", Language::En) => "Deadlines",
        ("deadlines", Language::Ru) => "Сроки",
        ("deadlines", Language::De) => "Fristen",
        ("deadlines", Language::Uk) => "Терміни",

        ("consequences", Language::En) => "Consequences",
        ("consequences", Language::Ru) => "Последствия",
        ("consequences", Language::De) => "Konsequenzen",
        ("consequences", Language::Uk) => "Наслідки",

        ("urgency_level", Language::En) => "Urgency",
        ("urgency_level", Language::Ru) => "Срочность",
        ("urgency_level", Language::De) => "Dringlichkeit",
        ("urgency_level", Language::Uk) => "Терміновість",

        ("response_template", Language::En) => "Suggested response",
        ("response_template", Language::Ru) => "Предлагаемый ответ",
        ("response_template", Language::De) => "Antwortvorschlag",
        ("response_template", Language::Uk) => "Пропонована відповідь",

        _ => "",
    }
}

/// Leading icon used when synthesizing `full_text` for display.
pub fn heading_icon(key: &str) -> &'static str {
    match key {
        "summary" => "\u{1F4C4}",
        "sender_info" => "\u{2709}",
        "document_type" => "\u{1F4CB}",
        "key_content" => "\u{1F50D}",
        "required_actions" => "\u{2705}",
        "deadlines" => "\u{23F0}",
        "consequences" => "\u{26A0}",
        "urgency_level" => "\u{1F6A8}",
        "response_template" => "\u{270D}",
        _ => "",
    }
}

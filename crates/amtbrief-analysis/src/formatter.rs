use amtbrief_core::types::Language;
use serde::{Deserialize, Serialize};

use crate::sections::{heading_icon, heading_label, SECTION_KEYS};

/// The nine named sections, keyed by the canonical English keys
/// regardless of the language the model answered in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSections {
    pub summary: String,
    pub sender_info: String,
    pub document_type: String,
    pub key_content: String,
    pub required_actions: String,
    pub deadlines: String,
    pub consequences: String,
    pub urgency_level: String,
    pub response_template: String,
}

impl AnalysisSections {
    fn set(&mut self, key: &str, value: String) {
        match key {
            "summary" => self.summary = value,
            "sender_info" => self.sender_info = value,
            "document_type" => self.document_type = value,
            "key_content" => self.key_content = value,
            "required_actions" => self.required_actions = value,
            "deadlines" => self.deadlines = value,
            "consequences" => self.consequences = value,
            "urgency_level" => self.urgency_level = value,
            "response_template" => self.response_template = value,
            _ => {}
        }
    }

    fn get(&self, key: &str) -> &str {
        match key {
            "summary" => &self.summary,
            "sender_info" => &self.sender_info,
            "document_type" => &self.document_type,
            "key_content" => &self.key_content,
            "required_actions" => &self.required_actions,
            "deadlines" => &self.deadlines,
            "consequences" => &self.consequences,
            "urgency_level" => &self.urgency_level,
            "response_template" => &self.response_template,
            _ => "",
        }
    }

    /// Concatenates sections with simple dividers and leading icons.
    pub fn full_text(&self) -> String {
        SECTION_KEYS
            .iter()
            .filter(|key| !self.get(key).is_empty())
            .map(|key| format!("{} {}\n{}", heading_icon(key), heading_label(key, Language::En), self.get(key)))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Strips `*`, `#`, backticks and leading bullet glyphs, collapses runs of
/// blank lines.
pub fn strip_formatting(raw: &str) -> String {
    let cleaned: Vec<String> = raw
        .lines()
        .map(|line| {
            let line = line.replace(['*', '#', '`'], "");
            let line = line.trim_start_matches(['-', '•', '·', '‣']).trim_start();
            line.trim_end().to_string()
        })
        .collect();

    let mut out = Vec::new();
    let mut prev_blank = false;
    for line in cleaned {
        let blank = line.is_empty();
        if blank && prev_blank {
            continue;
        }
        out.push(line);
        prev_blank = blank;
    }

    out.join("\n").trim().to_string()
}

/// Splits the model's cleaned answer on section headings into the nine-key
/// map. Tries the target language's headings first, then falls back to
/// every other supported language (models sometimes answer in a mix).
pub fn split_sections(cleaned: &str, language: Language) -> AnalysisSections {
    let languages = [language, Language::En, Language::De, Language::Ru, Language::Uk];

    let mut markers: Vec<(usize, &str)> = Vec::new();
    for line_start in line_starts(cleaned) {
        let line = &cleaned[line_start..];
        let line_end = line.find('\n').unwrap_or(line.len());
        let line = &line[..line_end];
        let trimmed = line.trim_end_matches(':').trim();

        for key in SECTION_KEYS {
            for lang in languages {
                let label = heading_label(key, lang);
                if !label.is_empty() && trimmed.eq_ignore_ascii_case(label) {
                    markers.push((line_start, key));
                }
            }
        }
    }

    markers.sort_by_key(|(pos, _)| *pos);
    markers.dedup_by_key(|(pos, _)| *pos);

    let mut sections = AnalysisSections::default();
    for (i, (pos, key)) in markers.iter().enumerate() {
        let body_start = cleaned[*pos..].find('\n').map(|n| pos + n + 1).unwrap_or(cleaned.len());
        let body_end = markers.get(i + 1).map(|(next, _)| *next).unwrap_or(cleaned.len());
        let body = cleaned[body_start..body_end].trim().to_string();
        sections.set(key, body);
    }

    // No headings recognized at all: put the whole answer in `summary` rather
    // than silently dropping it.
    if markers.is_empty() && !cleaned.trim().is_empty() {
        sections.summary = cleaned.trim().to_string();
    }

    sections
}

fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, c) in text.char_indices() {
        if c == '\n' {
            starts.push(i + 1);
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_formatting_removes_markdown_symbols() {
        let raw = "**Summary**\n# heading\n- bullet one\n`code`";
        let cleaned = strip_formatting(raw);
        assert!(!cleaned.contains('*'));
        assert!(!cleaned.contains('#'));
        assert!(!cleaned.contains('`'));
    }

    #[test]
    fn strip_formatting_collapses_blank_lines() {
        let raw = "line one\n\n\n\nline two";
        let cleaned = strip_formatting(raw);
        assert_eq!(cleaned, "line one\n\nline two");
    }

    #[test]
    fn split_sections_recognizes_english_headings() {
        let text = "Summary:\nThis is a tax notice.\n\nSender:\nCity tax office\n\nUrgency:\nhigh";
        let sections = split_sections(text, Language::En);
        assert_eq!(sections.summary, "This is a tax notice.");
        assert_eq!(sections.sender_info, "City tax office");
        assert_eq!(sections.urgency_level, "high");
    }

    #[test]
    fn split_sections_falls_back_to_summary_when_unrecognized() {
        let sections = split_sections("just plain prose with no headings", Language::En);
        assert!(sections.summary.contains("plain prose"));
    }

    #[test]
    fn full_text_skips_empty_sections() {
        let mut sections = AnalysisSections::default();
        sections.summary = "hello".to_string();
        let full = sections.full_text();
        assert!(full.contains("hello"));
        assert!(!full.contains("Sender"));
    }
}

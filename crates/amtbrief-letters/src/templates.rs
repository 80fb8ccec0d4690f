/// A small, fixed set of recipient categories and German letter
/// templates — variables are substituted with simple `{{name}}`
/// placeholders before the Composer asks the Router to polish the result.
pub struct LetterTemplate {
    pub category: &'static str,
    pub template_key: &'static str,
    pub subject_template: &'static str,
    pub body_template: &'static str,
    pub required_variables: &'static [&'static str],
}

pub const CATEGORIES: &[&str] = &["landlord", "employer", "insurance", "authority"];

pub const TEMPLATES: &[LetterTemplate] = &[
    LetterTemplate {
        category: "landlord",
        template_key: "rent_reduction_request",
        subject_template: "Mietminderung wegen {{mangel}}",
        body_template: "Sehr geehrte(r) {{empfaenger_name}},\n\nhiermit zeige ich Ihnen einen Mangel an der Mietsache in {{anschrift}} an: {{mangel}}. Der Mangel besteht seit {{datum}}.\n\nIch behalte mir eine Mietminderung vor, bis der Mangel behoben ist.\n\nMit freundlichen Grüßen\n{{absender_name}}",
        required_variables: &["empfaenger_name", "anschrift", "mangel", "datum", "absender_name"],
    },
    LetterTemplate {
        category: "landlord",
        template_key: "termination_notice",
        subject_template: "Kündigung des Mietverhältnisses {{anschrift}}",
        body_template: "Sehr geehrte(r) {{empfaenger_name}},\n\nhiermit kündige ich das Mietverhältnis für die Wohnung in {{anschrift}} fristgerecht zum {{kuendigungsdatum}}.\n\nMit freundlichen Grüßen\n{{absender_name}}",
        required_variables: &["empfaenger_name", "anschrift", "kuendigungsdatum", "absender_name"],
    },
    LetterTemplate {
        category: "employer",
        template_key: "sick_leave_notice",
        subject_template: "Krankmeldung",
        body_template: "Sehr geehrte(r) {{empfaenger_name}},\n\nhiermit melde ich mich ab dem {{datum}} krank. Die ärztliche Bescheinigung reiche ich schnellstmöglich nach.\n\nMit freundlichen Grüßen\n{{absender_name}}",
        required_variables: &["empfaenger_name", "datum", "absender_name"],
    },
    LetterTemplate {
        category: "insurance",
        template_key: "claim_objection",
        subject_template: "Widerspruch zu Ihrem Bescheid vom {{bescheid_datum}}",
        body_template: "Sehr geehrte Damen und Herren,\n\nich widerspreche hiermit Ihrem Bescheid vom {{bescheid_datum}} (Aktenzeichen {{aktenzeichen}}).\n\nBegründung: {{begruendung}}\n\nMit freundlichen Grüßen\n{{absender_name}}",
        required_variables: &["bescheid_datum", "aktenzeichen", "begruendung", "absender_name"],
    },
    LetterTemplate {
        category: "authority",
        template_key: "deadline_extension_request",
        subject_template: "Antrag auf Fristverlängerung, Aktenzeichen {{aktenzeichen}}",
        body_template: "Sehr geehrte Damen und Herren,\n\nin der Angelegenheit mit dem Aktenzeichen {{aktenzeichen}} bitte ich um Verlängerung der Frist bis zum {{neue_frist}}.\n\nGrund: {{begruendung}}\n\nMit freundlichen Grüßen\n{{absender_name}}",
        required_variables: &["aktenzeichen", "neue_frist", "begruendung", "absender_name"],
    },
];

pub fn find(category: &str, template_key: &str) -> Option<&'static LetterTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.category == category && t.template_key == template_key)
}

pub fn by_category(category: &str) -> Vec<&'static LetterTemplate> {
    TEMPLATES.iter().filter(|t| t.category == category).collect()
}

/// Substitutes `{{name}}` placeholders, failing on the first missing
/// required variable.
pub fn substitute(
    template_str: &str,
    required: &[&str],
    variables: &std::collections::HashMap<String, String>,
) -> Result<String, String> {
    for key in required {
        if !variables.contains_key(*key) {
            return Err(key.to_string());
        }
    }

    let mut out = template_str.to_string();
    for (key, value) in variables {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn substitute_fills_all_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("empfaenger_name".to_string(), "Herr Müller".to_string());
        vars.insert("anschrift".to_string(), "Hauptstraße 1".to_string());
        vars.insert("mangel".to_string(), "Schimmel im Bad".to_string());
        vars.insert("datum".to_string(), "01.01.2026".to_string());
        vars.insert("absender_name".to_string(), "Max Mustermann".to_string());

        let template = find("landlord", "rent_reduction_request").unwrap();
        let body = substitute(template.body_template, template.required_variables, &vars).unwrap();
        assert!(body.contains("Herr Müller"));
        assert!(!body.contains("{{"));
    }

    #[test]
    fn substitute_reports_first_missing_required_variable() {
        let vars = HashMap::new();
        let template = find("employer", "sick_leave_notice").unwrap();
        let result = substitute(template.body_template, template.required_variables, &vars);
        assert!(result.is_err());
    }
}

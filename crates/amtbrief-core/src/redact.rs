//! Single log-boundary secret redaction call site.
//!
//! Every place that emits a `tracing` event containing a string that might
//! carry a user-supplied or system provider key must pass it through
//! [`redact`] first, rather than scattering ad-hoc masking at each call
//! site.

/// Known provider key prefixes, used to find and mask a key even when it is
/// embedded in a longer string (e.g. an error message echoing a request URL).
const KNOWN_PREFIXES: &[&str] = &["AIzaSy", "sk-ant-", "sk-", "Bearer "];

/// Replaces any substring that looks like a provider key or bearer token
/// with a short masked placeholder, preserving the rest of the string.
pub fn redact(input: &str) -> String {
    let mut out = input.to_string();
    for prefix in KNOWN_PREFIXES {
        out = redact_prefixed(&out, prefix);
    }
    out
}

fn redact_prefixed(input: &str, prefix: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find(prefix) {
        result.push_str(&rest[..idx]);
        let after_prefix = &rest[idx + prefix.len()..];
        let token_len = after_prefix
            .find(|c: char| c.is_whitespace() || c == '"' || c == '\'')
            .unwrap_or(after_prefix.len());
        result.push_str(prefix);
        result.push_str("***REDACTED***");
        rest = &after_prefix[token_len..];
    }
    result.push_str(rest);
    result
}

/// Produces the fixed-length preview shown to clients for a stored
/// secret: first 4 chars + "…" + last 4 chars, never the raw value.
pub fn preview(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****…****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_gemini_key() {
        let msg = format!("using key AIzaSyDemo_abcdef1234 for request");
        let redacted = redact(&msg);
        assert!(!redacted.contains("abcdef1234"));
        assert!(redacted.contains("AIzaSy***REDACTED***"));
    }

    #[test]
    fn redacts_anthropic_key() {
        let redacted = redact("key=sk-ant-api03-xxxxxxxxxxxx end");
        assert!(!redacted.contains("xxxxxxxxxxxx"));
    }

    #[test]
    fn preview_is_bounded_and_has_one_ellipsis() {
        let p = preview("sk-ant-REDACTED");
        assert!(p.chars().count() <= 12);
        assert_eq!(p.matches('…').count(), 1);
    }

    #[test]
    fn preview_short_secret_does_not_leak() {
        let p = preview("short");
        assert!(!p.contains("short"));
    }
}

use std::sync::OnceLock;

use regex::Regex;

const EMPTY_SYNOPSIS: &str = "no description available";
const FALLBACK_CHARS: usize = 150;

/// Canned podcast lead-ins removed before summarizing.
pub const LEAD_IN_PHRASES: &[&str] = &["In this episode,", "Today we discuss", "Listen as", "Join us"];

fn lead_in_re() -> &'static Regex {
    static LEAD_IN_RE: OnceLock<Regex> = OnceLock::new();
    LEAD_IN_RE.get_or_init(|| {
        let alternatives = LEAD_IN_PHRASES
            .iter()
            .map(|phrase| regex::escape(phrase))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i){alternatives}")).expect("valid lead-in regex")
    })
}

fn sentence_re() -> &'static Regex {
    static SENTENCE_RE: OnceLock<Regex> = OnceLock::new();
    SENTENCE_RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]+").expect("valid sentence regex"))
}

/// Two-sentence summary of an episode description.
pub fn synopsis(description: &str) -> String {
    if description.trim().is_empty() {
        return EMPTY_SYNOPSIS.to_owned();
    }

    let stripped = lead_in_re().replace_all(description, "");
    let text = stripped.trim();

    let sentences: Vec<&str> = sentence_re()
        .find_iter(text)
        .map(|m| m.as_str().trim().trim_end_matches(['.', '!', '?']).trim())
        .filter(|s| !s.is_empty())
        .collect();

    match sentences.as_slice() {
        [] => truncate(text),
        [only] => format!("{only}."),
        [first, second, ..] => format!("{first}. {second}."),
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= FALLBACK_CHARS {
        return text.to_owned();
    }
    let head: String = text.chars().take(FALLBACK_CHARS).collect();
    format!("{head}...")
}

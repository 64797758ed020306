use std::borrow::Cow;

use deunicode::deunicode_char;
use lazy_regex::regex_replace_all;
use regex::{Regex, RegexBuilder};

const SUBMISSION_MAX_CHARS: usize = 32;
pub const TEAM_NAME_MAX_CHARS: usize = 16;

/// Lowercases, transliterates diacritics to their base characters and drops
/// everything that is not an ASCII letter or digit.
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());

    let mut add_char = |c: char| {
        if c.is_ascii_alphanumeric() {
            normalized.push(c.to_ascii_lowercase());
        }
    };

    for char in text.chars() {
        if char.is_ascii() {
            add_char(char);
        } else if let Some(deunicoded) = deunicode_char(char) {
            deunicoded.chars().for_each(&mut add_char);
        }
    }

    normalized.shrink_to_fit();
    normalized
}

/// Keeps letters (accents included), digits, spaces and `_.,:-`, trims and
/// truncates to `max_chars` characters.
pub fn sanitize(text: &str, max_chars: usize) -> String {
    let cleaned: Cow<str> = regex_replace_all!(r"[^\p{L}\p{N} _.,:-]", text, "");
    cleaned.trim().chars().take(max_chars).collect()
}

/// The form in which a submission is stored in the guess ledger.
pub fn sanitize_submission(text: &str) -> String {
    sanitize(text, SUBMISSION_MAX_CHARS)
}

/// A canonical answer. Matching is case-insensitive and unanchored, so a
/// pattern matches anywhere in the normalized submission unless the author
/// anchored it.
#[derive(Debug, Clone)]
pub struct AnswerPattern(Regex);

impl AnswerPattern {
    pub fn compile(pattern: &str) -> Result<AnswerPattern, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(AnswerPattern)
    }

    pub fn matches(&self, submitted: &str) -> bool {
        self.0.is_match(&normalize(submitted))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::{normalize, sanitize, sanitize_submission, AnswerPattern};

    #[test]
    fn normalize_simple() {
        assert_eq!(normalize("Eiffel Tower"), "eiffeltower");
    }

    #[test]
    fn normalize_diacritics_and_case() {
        assert_eq!(normalize("Café"), normalize("CAFE"));
        assert_eq!(normalize("Škoda Octávia"), "skodaoctavia");
    }

    #[test]
    fn normalize_drops_punctuation() {
        assert_eq!(normalize("  R2-D2, C-3PO!  "), "r2d2c3po");
    }

    #[test]
    fn normalize_is_idempotent() {
        for text in ["Ångström 1.5", "Žluťoučký kůň", "already123", ""] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn sanitize_keeps_allowed_characters() {
        assert_eq!(sanitize("  Crème brûlée: 2-1.  ", 32), "Crème brûlée: 2-1.");
        assert_eq!(sanitize("<b>bold</b>", 32), "bboldb");
    }

    #[test]
    fn sanitize_truncates_characters_not_bytes() {
        assert_eq!(sanitize("ééééé", 3), "ééé");
        assert_eq!(sanitize_submission(&"x".repeat(100)).len(), 32);
    }

    #[test]
    fn pattern_matches_substring() {
        let pattern = AnswerPattern::compile("paris").unwrap();
        assert!(pattern.matches("Paris"));
        assert!(pattern.matches("It's PARIS, France"));
        assert!(!pattern.matches("Lyon"));
    }

    #[test]
    fn pattern_alternatives_and_anchors() {
        let pattern = AnswerPattern::compile("^(mont blanc|montblanc)$").unwrap();
        assert!(pattern.matches("Mont-Blanc"));
        assert!(!pattern.matches("Mont Blanc du Tacul"));

        let pattern = AnswerPattern::compile("^cafe$").unwrap();
        assert!(pattern.matches("CAFÉ"));
    }

    #[test]
    fn pattern_is_case_insensitive() {
        let pattern = AnswerPattern::compile("EINSTEIN").unwrap();
        assert!(pattern.matches("albert einstein"));
    }

    #[test]
    fn invalid_pattern() {
        assert!(AnswerPattern::compile("(unclosed").is_err());
    }
}

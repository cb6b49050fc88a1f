use serde::{Deserialize, Serialize};

use crate::text::PunctuationStyle;

/// Per-session configuration, mutated only by config events for that session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Language hint passed to the recognition provider (BCP-47, e.g. "cs-CZ")
    pub speech_language: String,

    /// Source language for translation (ISO-639-1)
    pub translation_from: String,

    /// Target language for translation (ISO-639-1)
    pub translation_to: String,

    /// Whether the punctuation/formatting pass runs before translation
    pub enrichment_enabled: bool,

    /// Selected punctuation style
    pub punctuation_style: PunctuationStyle,

    /// Active recognition provider id for this session
    pub provider_id: String,
}

impl SessionConfig {
    pub fn new(session_id: String, default_provider: &str) -> Self {
        Self {
            session_id,
            speech_language: "en-US".to_string(),
            translation_from: "en".to_string(),
            translation_to: "en".to_string(),
            enrichment_enabled: true,
            punctuation_style: PunctuationStyle::default(),
            provider_id: default_provider.to_string(),
        }
    }
}

/// Loose validation for client-supplied language codes: a 2-3 letter base,
/// optionally followed by a dash and a 2-4 character region/script part.
/// Invalid codes are ignored by the config handlers, valid ones applied.
pub fn is_valid_language_code(code: &str) -> bool {
    let mut parts = code.split('-');
    let base = match parts.next() {
        Some(b) => b,
        None => return false,
    };
    if !(2..=3).contains(&base.len()) || !base.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    for part in parts {
        if !(2..=4).contains(&part.len()) || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_language_codes() {
        assert!(is_valid_language_code("en"));
        assert!(is_valid_language_code("cs-CZ"));
        assert!(is_valid_language_code("zh-Hant"));
        assert!(is_valid_language_code("deu"));
    }

    #[test]
    fn test_invalid_language_codes() {
        assert!(!is_valid_language_code(""));
        assert!(!is_valid_language_code("e"));
        assert!(!is_valid_language_code("english"));
        assert!(!is_valid_language_code("en-"));
        assert!(!is_valid_language_code("en US"));
        assert!(!is_valid_language_code("12"));
    }
}

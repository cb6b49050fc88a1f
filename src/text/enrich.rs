use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed set of punctuation/formatting styles a session can select.
///
/// Unrecognized style names fall back to [`PunctuationStyle::Sentence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunctuationStyle {
    /// Capitalize the first letter and close with terminal punctuation
    #[default]
    Sentence,
    /// Whitespace normalization only, casing and punctuation untouched
    Plain,
}

impl PunctuationStyle {
    /// Parse a style name, falling back to the default for unknown input.
    pub fn parse_or_default(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "sentence" => Self::Sentence,
            "plain" => Self::Plain,
            _ => Self::default(),
        }
    }

    pub fn is_known(name: &str) -> bool {
        matches!(name.trim().to_lowercase().as_str(), "sentence" | "plain")
    }
}

/// Result of an enrichment pass.
#[derive(Debug, Clone)]
pub struct EnrichedText {
    pub text: String,
    pub applied: bool,
}

/// Punctuation/formatting normalization applied to raw recognized text
/// before translation.
///
/// The pass is idempotent: enriching already-enriched text yields the same
/// string. It never errors to the caller; anything it cannot handle comes
/// back unchanged with `applied=false`.
pub struct TextEnricher;

impl TextEnricher {
    pub fn enrich(text: &str, _language: Option<&str>, style: PunctuationStyle) -> EnrichedText {
        let collapsed = Self::collapse_whitespace(text);
        if collapsed.is_empty() {
            return EnrichedText {
                text: text.to_string(),
                applied: false,
            };
        }

        let enriched = match style {
            PunctuationStyle::Plain => collapsed,
            PunctuationStyle::Sentence => {
                let capitalized = Self::capitalize_first(&collapsed);
                Self::ensure_terminal_punctuation(&capitalized)
            }
        };

        debug!("Enriched text ({:?}): {} chars", style, enriched.len());
        EnrichedText {
            text: enriched,
            applied: true,
        }
    }

    fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn capitalize_first(text: &str) -> String {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }

    fn ensure_terminal_punctuation(text: &str) -> String {
        match text.chars().last() {
            Some(c) if matches!(c, '.' | '!' | '?' | ',' | ';' | ':' | '…') => text.to_string(),
            Some(_) => format!("{}.", text),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_style_capitalizes_and_punctuates() {
        let result = TextEnricher::enrich("hello world", None, PunctuationStyle::Sentence);
        assert!(result.applied);
        assert_eq!(result.text, "Hello world.");
    }

    #[test]
    fn test_enrich_is_idempotent() {
        let once = TextEnricher::enrich("ahoj  světe", Some("cs"), PunctuationStyle::Sentence);
        let twice = TextEnricher::enrich(&once.text, Some("cs"), PunctuationStyle::Sentence);
        assert_eq!(once.text, twice.text);
    }

    #[test]
    fn test_plain_style_only_normalizes_whitespace() {
        let result = TextEnricher::enrich("  hello   world ", None, PunctuationStyle::Plain);
        assert!(result.applied);
        assert_eq!(result.text, "hello world");
    }

    #[test]
    fn test_whitespace_only_input_not_applied() {
        let result = TextEnricher::enrich("   ", None, PunctuationStyle::Sentence);
        assert!(!result.applied);
        assert_eq!(result.text, "   ");
    }

    #[test]
    fn test_existing_punctuation_kept() {
        let result = TextEnricher::enrich("Is this final?", None, PunctuationStyle::Sentence);
        assert_eq!(result.text, "Is this final?");
    }

    #[test]
    fn test_unknown_style_falls_back_to_default() {
        assert_eq!(
            PunctuationStyle::parse_or_default("fancy"),
            PunctuationStyle::Sentence
        );
        assert!(!PunctuationStyle::is_known("fancy"));
        assert!(PunctuationStyle::is_known("plain"));
    }
}

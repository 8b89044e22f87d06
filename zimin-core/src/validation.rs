//! Text Validation - Rules Reject, Requests Carry Proof
//!
//! Every string is checked before any image I/O happens.
//! A `RenderRequest` can only be built from texts that passed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DEFAULT_MAX_TEXT_LENGTH;

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TextRejection {
    #[error("empty input")]
    Empty,

    #[error("too long: '{text}' has {length} characters, limit is {max}")]
    TooLong {
        text: String,
        length: usize,
        max: usize,
    },
}

impl TextRejection {
    /// Short reason code, stable across messages.
    pub fn reason(&self) -> &'static str {
        match self {
            TextRejection::Empty => "empty input",
            TextRejection::TooLong { .. } => "too long",
        }
    }
}

/// Validation rule trait - rejects or passes a single text
pub trait TextRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, text: &str) -> Option<TextRejection>;
}

// --- Concrete Rules ---

pub struct NonEmptyRule;

impl TextRule for NonEmptyRule {
    fn name(&self) -> &'static str { "non_empty" }

    fn check(&self, text: &str) -> Option<TextRejection> {
        text.is_empty().then_some(TextRejection::Empty)
    }
}

pub struct MaxLengthRule {
    pub max: usize,
}

impl TextRule for MaxLengthRule {
    fn name(&self) -> &'static str { "max_length" }

    fn check(&self, text: &str) -> Option<TextRejection> {
        // Characters, not bytes: "当破即破！" is 5 long.
        let length = text.chars().count();
        if length > self.max {
            Some(TextRejection::TooLong {
                text: text.to_string(),
                length,
                max: self.max,
            })
        } else {
            None
        }
    }
}

/// Runs rules in order, first rejection wins
pub struct TextValidator {
    rules: Vec<Box<dyn TextRule>>,
}

impl TextValidator {
    pub fn new(max_length: usize) -> Self {
        Self {
            rules: vec![
                Box::new(NonEmptyRule),
                Box::new(MaxLengthRule { max: max_length }),
            ],
        }
    }

    pub fn validate(&self, text: &str) -> Result<(), TextRejection> {
        for rule in &self.rules {
            if let Some(rejection) = rule.check(text) {
                tracing::debug!(rule = rule.name(), text, "Text rejected");
                return Err(rejection);
            }
        }
        Ok(())
    }
}

impl Default for TextValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TEXT_LENGTH)
    }
}

/// Check one input string against the emptiness and length rules.
pub fn validate_text(text: &str, max_length: usize) -> Result<(), TextRejection> {
    TextValidator::new(max_length).validate(text)
}

/// Three texts, one per slot, all of which passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    texts: [String; 3],
}

impl RenderRequest {
    /// Validates left, middle and right in that order.
    pub fn new(texts: [&str; 3], max_length: usize) -> Result<Self, TextRejection> {
        let validator = TextValidator::new(max_length);
        for text in texts {
            validator.validate(text)?;
        }
        Ok(Self {
            texts: texts.map(str::to_string),
        })
    }

    pub fn texts(&self) -> &[String; 3] {
        &self.texts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_lengths_in_range() {
        for len in 1..=15 {
            let text = "a".repeat(len);
            assert!(validate_text(&text, 15).is_ok(), "length {len}");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_text("", 15), Err(TextRejection::Empty));
        assert_eq!(TextRejection::Empty.reason(), "empty input");
    }

    #[test]
    fn test_rejects_over_length() {
        let err = validate_text(&"x".repeat(16), 15).unwrap_err();
        assert_eq!(err.reason(), "too long");
        match err {
            TextRejection::TooLong { length, max, .. } => {
                assert_eq!(length, 16);
                assert_eq!(max, 15);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 15 CJK characters are 45 bytes in UTF-8
        let text = "当".repeat(15);
        assert_eq!(text.len(), 45);
        assert!(validate_text(&text, 15).is_ok());
        assert!(validate_text(&"当".repeat(16), 15).is_err());
    }

    #[test]
    fn test_rejection_names_offending_text() {
        let err = validate_text("abcdef", 3).unwrap_err();
        assert!(err.to_string().contains("'abcdef'"));
    }

    #[test]
    fn test_request_validates_every_slot() {
        let ok = RenderRequest::new(["当破即破！", "当断即断！", "?!当当!?"], 15).unwrap();
        assert_eq!(ok.texts()[0], "当破即破！");
        assert_eq!(ok.texts()[1], "当断即断！");
        assert_eq!(ok.texts()[2], "?!当当!?");

        assert_eq!(
            RenderRequest::new(["a", "", "c"], 15),
            Err(TextRejection::Empty)
        );
        assert!(RenderRequest::new(["a", "b", "too long here"], 5).is_err());
    }
}

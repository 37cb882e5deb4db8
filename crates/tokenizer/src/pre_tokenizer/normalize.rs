//! Unicode normalization for pre-tokenization.
//!
//! With case folding enabled, text is composed to NFC and then lowercased.
//! With it disabled, text passes through untouched.

use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// Text normalizer shared by training and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    /// Apply NFC + lowercase
    lowercase: bool,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }

    /// Normalize text.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !self.lowercase {
            return Cow::Borrowed(text);
        }
        let composed: String = text.nfc().collect();
        Cow::Owned(composed.to_lowercase())
    }

    /// Check if case folding is enabled.
    pub fn is_enabled(&self) -> bool {
        self.lowercase
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("Hello WORLD"), "hello world");
    }

    #[test]
    fn test_nfc_before_lowercase() {
        let normalizer = Normalizer::new(true);
        // E + combining acute accent
        let result = normalizer.normalize("E\u{0301}");
        assert_eq!(result, "\u{00e9}");
    }

    #[test]
    fn test_disabled_is_passthrough() {
        let normalizer = Normalizer::new(false);
        assert!(!normalizer.is_enabled());
        assert!(matches!(normalizer.normalize("Hé\u{0301}"), Cow::Borrowed("Hé\u{0301}")));
    }
}

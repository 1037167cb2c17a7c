//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! text normalization and id parsing so every operation treats input the
//! same way.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("invalid {label} id")))
}

/// Trim and NFC-normalize user supplied text.
pub(crate) fn normalize_text(value: &str) -> String {
    value.trim().nfc().collect()
}

/// Number of user-perceived characters after normalization.
pub(crate) fn text_len(value: &str) -> usize {
    normalize_text(value).chars().count()
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_text)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composed_and_decomposed_have_same_length() {
        // "Pão" written with a combining tilde.
        let decomposed = "Pa\u{0303}o";
        assert_eq!(text_len(decomposed), 3);
        assert_eq!(normalize_text(decomposed), "Pão");
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(normalize_optional_text(Some(" ok ")), Some("ok".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }
}

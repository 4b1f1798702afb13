//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Trim a required name and reject it when empty or longer than `max` chars.
pub(crate) fn normalize_required_name(value: &str, label: &str, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    if trimmed.chars().count() > max {
        return Err(EngineError::InvalidName(format!(
            "{label} name must have at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim optional text, mapping blank strings to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Emails are compared case-insensitively; store them lower-case.
pub(crate) fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(
            normalize_required_name("  Aluguel ", "entry", 10).unwrap(),
            "Aluguel"
        );
        assert!(normalize_required_name("   ", "entry", 10).is_err());
        assert!(normalize_required_name("abcdefghijk", "entry", 10).is_err());
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" car ")).as_deref(), Some("car"));
        assert_eq!(normalize_optional_text(None), None);
    }
}

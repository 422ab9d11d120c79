//! Input validation shared by the HTTP handlers.
//!
//! Each validator returns [`CoreError::Validation`] with a message that can
//! be shown to the user as-is.

use crate::error::CoreError;
use crate::types::MinorUnits;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_BODY_LEN: usize = 10_000;
pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Reject empty or whitespace-only text and text longer than `max_len`.
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

pub fn validate_title(value: &str) -> Result<(), CoreError> {
    validate_text("title", value, MAX_TITLE_LEN)
}

pub fn validate_body(value: &str) -> Result<(), CoreError> {
    validate_text("body", value, MAX_BODY_LEN)
}

/// Prices are stored in minor units and may be zero (free course).
pub fn validate_price(field: &str, value: MinorUnits) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

/// Referral codes are 4-32 ASCII letters, digits, `-` or `_`.
pub fn validate_referral_code(code: &str) -> Result<(), CoreError> {
    let len = code.len();
    if !(4..=32).contains(&len)
        || !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(
            "code must be 4-32 characters of letters, digits, '-' or '_'".into(),
        ));
    }
    Ok(())
}

/// Canonical form of a referral code for storage and lookup.
pub fn normalize_referral_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn text_rejects_blank() {
        assert_matches!(validate_title("   "), Err(CoreError::Validation(_)));
        assert!(validate_title("Intro to Rust").is_ok());
    }

    #[test]
    fn text_rejects_too_long() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert_matches!(validate_title(&long), Err(CoreError::Validation(_)));
    }

    #[test]
    fn price_allows_free() {
        assert!(validate_price("price_etb", 0).is_ok());
        assert_matches!(validate_price("price_etb", -1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn referral_codes() {
        assert!(validate_referral_code("ABEBE-10").is_ok());
        assert!(validate_referral_code("abc").is_err());
        assert!(validate_referral_code("has space").is_err());
        assert_eq!(normalize_referral_code(" abebe-10 "), "ABEBE-10");
    }
}

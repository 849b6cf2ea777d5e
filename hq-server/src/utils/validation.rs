//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so every write path
//! goes through these.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: employee names, meeting titles, cities, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes and free-text reasons (target reasons, leave reasons)
pub const MAX_NOTE_LEN: usize = 500;

/// Target reasons additionally have a floor: one-word excuses are
/// rejected the same as essays over the cap.
pub const MIN_REASON_LEN: usize = 10;

/// Short identifiers: emp ids, phone numbers, truck/order numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a bounded free-text field (target reasons: 10..=500 chars).
pub fn validate_bounded_text(
    value: &str,
    field: &str,
    min_len: usize,
    max_len: usize,
) -> Result<(), AppError> {
    let len = value.trim().len();
    if len < min_len || len > max_len {
        return Err(AppError::validation(format!(
            "{field} must be between {min_len} and {max_len} characters (got {len})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_empty_and_oversize() {
        assert!(validate_required_text("ok", "name", 10).is_ok());
        assert!(validate_required_text("   ", "name", 10).is_err());
        assert!(validate_required_text("12345678901", "name", 10).is_err());
    }

    #[test]
    fn bounded_text_enforces_floor_and_cap() {
        assert!(validate_bounded_text("short", "reason", 10, 500).is_err());
        assert!(validate_bounded_text("a perfectly fine reason", "reason", 10, 500).is_ok());
        let long = "x".repeat(501);
        assert!(validate_bounded_text(&long, "reason", 10, 500).is_err());
        // exactly at the bounds
        assert!(validate_bounded_text(&"y".repeat(10), "reason", 10, 500).is_ok());
        assert!(validate_bounded_text(&"y".repeat(500), "reason", 10, 500).is_ok());
    }

    #[test]
    fn bounded_text_trims_before_measuring() {
        assert!(validate_bounded_text("   nine ch   ", "reason", 10, 500).is_err());
    }
}

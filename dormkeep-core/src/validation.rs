//! Coercion of primitive caller input.
//!
//! Everything here runs before a store session is acquired: input that
//! fails these checks never reaches the store.

use crate::error::{DormError, Result};

/// Parses a record id supplied as text.
///
/// # Errors
/// Returns a validation error for empty or non-numeric input.
///
/// # Example
/// ```rust
/// use dormkeep_core::validation::parse_record_id;
///
/// assert_eq!(parse_record_id(" 42 ").unwrap(), 42);
/// assert!(parse_record_id("4x").is_err());
/// ```
pub fn parse_record_id(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DormError::validation("Please provide an ID."));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| DormError::validation(format!("'{trimmed}' is not a valid numeric id")))
}

/// Parses an optional record id; empty input means "none".
///
/// # Errors
/// Returns a validation error for non-numeric input.
pub fn parse_optional_id(raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_record_id(value).map(Some),
    }
}

/// Parses a payment amount supplied as text.
///
/// # Errors
/// Returns a validation error unless the input is a finite number.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let amount = trimmed
        .parse::<f64>()
        .map_err(|_| DormError::validation(format!("'{trimmed}' is not a valid amount")))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Rejects amounts that cannot be stored meaningfully.
///
/// # Errors
/// Returns a validation error for NaN or infinite values.
pub fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(DormError::validation("Amount must be a finite number"))
    }
}

/// Rejects blank text fields.
///
/// # Errors
/// Returns a validation error naming `field` when `value` is blank.
pub fn require_text<'v>(field: &str, value: &'v str) -> Result<&'v str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DormError::validation(format!("{field} cannot be empty")))
    } else {
        Ok(trimmed)
    }
}

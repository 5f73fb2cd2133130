//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API.

use crate::{EngineError, ResultEngine};

/// Normalizes an ISO-4217 style currency code to upper case.
pub(crate) fn normalize_currency(value: &str) -> ResultEngine<String> {
    let code = value.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EngineError::InvalidInput(format!(
            "invalid currency: {value}"
        )));
    }
    Ok(code)
}

/// Validates an IANA timezone name.
pub(crate) fn normalize_timezone(value: &str) -> ResultEngine<String> {
    let name = value.trim();
    name.parse::<chrono_tz::Tz>()
        .map(|tz| tz.name().to_string())
        .map_err(|_| EngineError::InvalidInput(format!("invalid timezone: {value}")))
}

/// Project and BOM quantities are strictly positive.
pub(crate) fn ensure_positive_quantity(quantity: i32) -> ResultEngine<i32> {
    if quantity <= 0 {
        return Err(EngineError::InvalidInput(
            "quantity must be greater than zero".to_string(),
        ));
    }
    Ok(quantity)
}

/// Appends `note` to `existing` separated by a blank line.
pub(crate) fn append_note(existing: &str, note: &str) -> String {
    if existing.trim().is_empty() {
        note.to_string()
    } else {
        format!("{existing}\n\n{note}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_are_upper_cased() {
        assert_eq!(normalize_currency(" usd ").unwrap(), "USD");
        assert!(normalize_currency("US").is_err());
        assert!(normalize_currency("U5D").is_err());
    }

    #[test]
    fn timezone_must_be_iana() {
        assert_eq!(
            normalize_timezone("America/Chicago").unwrap(),
            "America/Chicago"
        );
        assert!(normalize_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn notes_append_never_replace() {
        assert_eq!(append_note("", "first"), "first");
        assert_eq!(append_note("first", "second"), "first\n\nsecond");
    }
}

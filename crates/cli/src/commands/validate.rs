//! Input guards for mutating commands.
//!
//! Reads are permissive (malformed cells degrade to defaults); writes are
//! not; a transaction that fails these checks never reaches the book.

use crate::CliError;

/// Required text field, non-empty after trimming.
pub fn require(field: &str, value: &str) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub fn positive(field: &str, value: f64) -> Result<(), CliError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CliError::validation(format!(
            "{field} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: f64) -> Result<(), CliError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CliError::validation(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::EXIT_VALIDATION;

    #[test]
    fn require_trims_and_rejects_blank() {
        assert_eq!(require("--buyer", "  Acme ").unwrap(), "Acme");
        let err = require("--buyer", "   ").unwrap_err();
        assert_eq!(err.code, EXIT_VALIDATION);
        assert!(err.message.contains("--buyer"));
    }

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(positive("--qty", 1.0).is_ok());
        assert!(positive("--qty", 0.0).is_err());
        assert!(positive("--qty", -5.0).is_err());
        assert!(positive("--qty", f64::NAN).is_err());
    }

    #[test]
    fn non_negative_allows_zero() {
        assert!(non_negative("--price", 0.0).is_ok());
        assert!(non_negative("--price", -0.01).is_err());
    }
}

//! Input validation for ledger mutations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors for retainer operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Hours must be strictly positive.
    #[error("Hours must be positive, got {0}")]
    NonPositiveHours(Decimal),

    /// Description must be non-empty.
    #[error("Description must not be empty")]
    EmptyDescription,

    /// Client name must be non-empty.
    #[error("Client name must not be empty")]
    EmptyName,
}

/// Validates an hours magnitude.
///
/// Storage only ever holds strictly positive magnitudes; the effect
/// sign is derived from the entry kind.
///
/// # Errors
///
/// Returns `NonPositiveHours` for zero or negative values.
pub fn validate_hours(hours: Decimal) -> Result<(), ValidationError> {
    if hours <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveHours(hours));
    }
    Ok(())
}

/// Validates a work log description.
///
/// # Errors
///
/// Returns `EmptyDescription` when the trimmed text is empty.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}

/// Validates a client display name.
///
/// # Errors
///
/// Returns `EmptyName` when the trimmed name is empty.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0.25))]
    #[case(dec!(1))]
    #[case(dec!(999.99))]
    fn test_positive_hours_accepted(#[case] hours: Decimal) {
        assert!(validate_hours(hours).is_ok());
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    #[case(dec!(-0.01))]
    fn test_non_positive_hours_rejected(#[case] hours: Decimal) {
        assert_eq!(
            validate_hours(hours),
            Err(ValidationError::NonPositiveHours(hours))
        );
    }

    #[test]
    fn test_description_rules() {
        assert!(validate_description("fixed the build").is_ok());
        assert_eq!(
            validate_description(""),
            Err(ValidationError::EmptyDescription)
        );
        assert_eq!(
            validate_description("   \t\n"),
            Err(ValidationError::EmptyDescription)
        );
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Acme Corp").is_ok());
        assert_eq!(validate_name("  "), Err(ValidationError::EmptyName));
    }
}

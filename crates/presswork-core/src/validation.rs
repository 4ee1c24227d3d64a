//! # Validation Module
//!
//! Input validation utilities for Presswork.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service entry (backoffice)                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field and business rule validation                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: both layers catch different errors                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_INSTALLMENTS, MAX_REMINDER_DAYS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, human-facing name field (supplier, material,
/// client, account, expense item).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use presswork_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount that must be strictly positive
/// (payments, transaction amounts, installment balances).
pub fn validate_positive_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a monetary amount that may be zero but not negative
/// (prices, totals).
pub fn validate_non_negative_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a quantity value (order items, purchase quantities).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a percentage in basis points.
///
/// ## Rules
/// - Must be strictly positive (a zero-percent rule or margin is
///   configured by deactivating, not by zeroing)
/// - Must not exceed 10000 (100%)
pub fn validate_percent_bps(field: &str, bps: i64) -> ValidationResult<()> {
    if bps <= 0 || bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates an installment count.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_INSTALLMENTS (60)
pub fn validate_installment_count(count: u32) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::MustBePositive {
            field: "total_installments".to_string(),
        });
    }

    if count > MAX_INSTALLMENTS {
        return Err(ValidationError::OutOfRange {
            field: "total_installments".to_string(),
            min: 1,
            max: MAX_INSTALLMENTS as i64,
        });
    }

    Ok(())
}

/// Validates a reminder lead time in days.
///
/// Zero is allowed (remind on the day itself).
pub fn validate_reminder_days(days: i64) -> ValidationResult<()> {
    if days < 0 || days > MAX_REMINDER_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "reminder_days".to_string(),
            min: 0,
            max: MAX_REMINDER_DAYS,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("supplier_name", "Karachi Paper Mart").is_ok());
        assert!(validate_name("supplier_name", "").is_err());
        assert!(validate_name("supplier_name", "   ").is_err());
        assert!(validate_name("supplier_name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("amount", 1).is_ok());
        assert!(validate_positive_amount("amount", 0).is_err());
        assert!(validate_positive_amount("amount", -500).is_err());
    }

    #[test]
    fn test_validate_non_negative_amount() {
        assert!(validate_non_negative_amount("price", 0).is_ok());
        assert!(validate_non_negative_amount("price", 1099).is_ok());
        assert!(validate_non_negative_amount("price", -1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(500).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_percent_bps() {
        assert!(validate_percent_bps("percent", 1).is_ok());
        assert!(validate_percent_bps("percent", 10_000).is_ok());
        assert!(validate_percent_bps("percent", 0).is_err());
        assert!(validate_percent_bps("percent", 10_001).is_err());
        assert!(validate_percent_bps("percent", -100).is_err());
    }

    #[test]
    fn test_validate_installment_count() {
        assert!(validate_installment_count(1).is_ok());
        assert!(validate_installment_count(60).is_ok());
        assert!(validate_installment_count(0).is_err());
        assert!(validate_installment_count(61).is_err());
    }

    #[test]
    fn test_validate_reminder_days() {
        assert!(validate_reminder_days(0).is_ok());
        assert!(validate_reminder_days(7).is_ok());
        assert!(validate_reminder_days(90).is_ok());
        assert!(validate_reminder_days(-1).is_err());
        assert!(validate_reminder_days(91).is_err());
    }
}

//! Validation utilities for the Warehouse Back-Office Platform
//!
//! Input checks shared by the single and bulk operation paths. Each helper
//! rejects before any mutation happens.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Maximum accepted SKU length.
pub const MAX_SKU_LENGTH: usize = 64;

/// Maximum accepted ticket name length.
pub const MAX_TICKET_NAME_LENGTH: usize = 120;

/// Validate a transaction quantity for add/subtract (must be strictly positive).
pub fn validate_quantity_positive(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a quantity for set and for thresholds (must not be negative).
pub fn validate_quantity_non_negative(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity must not be negative");
    }
    Ok(())
}

/// Validate a variant SKU: non-empty, bounded length, alphanumeric plus `-._`.
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    let trimmed = sku.trim();
    if trimmed.is_empty() {
        return Err("SKU cannot be empty");
    }
    if trimmed.len() > MAX_SKU_LENGTH {
        return Err("SKU is too long");
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
    {
        return Err("SKU may only contain alphanumeric characters, '-', '.' and '_'");
    }
    Ok(())
}

/// Validate the minimum/maximum threshold pair of a stock record.
///
/// The minimum must not be negative; when a maximum is present it must lie
/// strictly above the minimum.
pub fn validate_threshold_bounds(
    min_alert: Decimal,
    max_level: Option<Decimal>,
) -> Result<(), &'static str> {
    if min_alert < Decimal::ZERO {
        return Err("Minimum alert stock must not be negative");
    }
    if let Some(max) = max_level {
        if max <= min_alert {
            return Err("Maximum stock level must be greater than the minimum alert stock");
        }
    }
    Ok(())
}

/// Validate a ticket line item's expected date against the current date.
pub fn validate_expected_date(expected: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if expected < today {
        return Err("Expected date must not be in the past");
    }
    Ok(())
}

/// Validate a ticket name: non-empty after trimming, bounded length.
pub fn validate_ticket_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Ticket name cannot be empty");
    }
    if trimmed.len() > MAX_TICKET_NAME_LENGTH {
        return Err("Ticket name is too long");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_quantity_positive() {
        assert!(validate_quantity_positive(dec("0.1")).is_ok());
        assert!(validate_quantity_positive(dec("100")).is_ok());
        assert!(validate_quantity_positive(Decimal::ZERO).is_err());
        assert!(validate_quantity_positive(dec("-5")).is_err());
    }

    #[test]
    fn test_validate_quantity_non_negative() {
        assert!(validate_quantity_non_negative(Decimal::ZERO).is_ok());
        assert!(validate_quantity_non_negative(dec("3.5")).is_ok());
        assert!(validate_quantity_non_negative(dec("-0.01")).is_err());
    }

    #[test]
    fn test_validate_sku_valid() {
        assert!(validate_sku("SKU-001").is_ok());
        assert!(validate_sku("raw.steel_plate-3mm").is_ok());
        assert!(validate_sku("  SKU-001  ").is_ok());
    }

    #[test]
    fn test_validate_sku_invalid() {
        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("SKU 001").is_err());
        assert!(validate_sku(&"X".repeat(MAX_SKU_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_threshold_bounds() {
        assert!(validate_threshold_bounds(Decimal::ZERO, None).is_ok());
        assert!(validate_threshold_bounds(dec("10"), Some(dec("100"))).is_ok());
        assert!(validate_threshold_bounds(dec("-1"), None).is_err());
        assert!(validate_threshold_bounds(dec("10"), Some(dec("10"))).is_err());
        assert!(validate_threshold_bounds(dec("10"), Some(dec("5"))).is_err());
    }

    #[test]
    fn test_validate_expected_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();

        assert!(validate_expected_date(today, today).is_ok());
        assert!(validate_expected_date(tomorrow, today).is_ok());
        assert!(validate_expected_date(yesterday, today).is_err());
    }

    #[test]
    fn test_validate_ticket_name() {
        assert!(validate_ticket_name("June restock").is_ok());
        assert!(validate_ticket_name("").is_err());
        assert!(validate_ticket_name("   ").is_err());
        assert!(validate_ticket_name(&"n".repeat(MAX_TICKET_NAME_LENGTH + 1)).is_err());
    }
}

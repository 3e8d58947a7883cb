//! Validation and stock arithmetic helpers
//!
//! Pure functions shared by the backend services and exercised directly by
//! the property tests. Services translate the `&'static str` errors into
//! field-level API errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Movement Validations
// ============================================================================

/// Validate a movement quantity magnitude (must be strictly positive)
pub fn validate_movement_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a unit price (must not be negative)
pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    Ok(())
}

/// Validate the expiry date on an incoming batch: it must lie strictly after
/// `today`; a batch expiring today is rejected
pub fn validate_expiry_date(expiry: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if expiry <= today {
        return Err("Expiry date must be in the future");
    }
    Ok(())
}

/// Validate an adjustment reason (non-empty after trimming)
pub fn validate_reason(reason: &str) -> Result<(), &'static str> {
    if reason.trim().is_empty() {
        return Err("Reason cannot be empty");
    }
    Ok(())
}

/// Validate a required text field (name, category, supplier, ...)
pub fn validate_required_text(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Field cannot be empty");
    }
    Ok(())
}

/// Validate an initial on-hand quantity or threshold (must not be negative)
pub fn validate_non_negative(value: i32) -> Result<(), &'static str> {
    if value < 0 {
        return Err("Value cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Stock Arithmetic
// ============================================================================

/// Remaining quantity after removing `requested` units from `on_hand`, or
/// `None` when the removal would drive the ledger negative.
pub fn remaining_after_removal(on_hand: i32, requested: i32) -> Option<i32> {
    if requested > on_hand {
        None
    } else {
        Some(on_hand - requested)
    }
}

/// Total amount for a priced movement
pub fn total_amount(quantity: i32, unit_price: Decimal) -> Decimal {
    unit_price * Decimal::from(quantity)
}

// ============================================================================
// Alert Classification
// ============================================================================

/// Expiry classification of a medication relative to `today`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Ok,
    /// Expires within the configured window, today included
    ExpiringSoon,
    Expired,
}

/// Classify an expiry date against `today` and an inclusive look-ahead window
pub fn expiry_status(expiry: NaiveDate, today: NaiveDate, window_days: i64) -> ExpiryStatus {
    if expiry < today {
        ExpiryStatus::Expired
    } else if expiry <= today + chrono::Duration::days(window_days) {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Ok
    }
}

/// Low-stock check: at or below the configured threshold
pub fn is_low_stock(quantity: i32, threshold: i32) -> bool {
    quantity <= threshold
}

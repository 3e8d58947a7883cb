//! Stock movement tests
//!
//! Tests for the movement arithmetic and validation rules:
//! - ledger/log consistency (quantity == baseline + sum of signed deltas)
//! - no negative stock under any operation sequence
//! - per-kind delta signing and before/after snapshot arithmetic

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{AdjustmentKind, MovementKind};
use shared::validation::{
    remaining_after_removal, total_amount, validate_expiry_date, validate_movement_quantity,
    validate_reason, validate_unit_price,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// In-memory mirror of the movement processor's arithmetic: applies the
/// same guards in the same order and keeps the delta log for invariant
/// checks.
struct LedgerModel {
    baseline: i32,
    quantity: i32,
    deltas: Vec<i32>,
}

impl LedgerModel {
    fn new(initial: i32) -> Self {
        Self {
            baseline: initial,
            quantity: initial,
            deltas: Vec::new(),
        }
    }

    /// Apply one movement, returning the (previous, new) snapshot pair
    fn apply(&mut self, kind: MovementKind, magnitude: i32) -> Result<(i32, i32), &'static str> {
        validate_movement_quantity(magnitude)?;

        let new_quantity = if kind.is_inbound() {
            self.quantity + magnitude
        } else {
            remaining_after_removal(self.quantity, magnitude).ok_or("insufficient stock")?
        };

        let previous = self.quantity;
        self.quantity = new_quantity;
        self.deltas.push(kind.signed_delta(magnitude));
        Ok((previous, new_quantity))
    }

    fn delta_sum(&self) -> i32 {
        self.deltas.iter().sum()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;
    use chrono::NaiveDate;

    /// Sale reduces stock and snapshots before/after quantities
    #[test]
    fn test_sale_reduces_stock() {
        let mut ledger = LedgerModel::new(50);
        let (previous, new) = ledger.apply(MovementKind::Sale, 45).unwrap();

        assert_eq!(previous, 50);
        assert_eq!(new, 5);
        assert_eq!(ledger.quantity, 5);
        // quantity = 5 with threshold 10 lands in the low-stock set
        assert!(shared::validation::is_low_stock(5, 10));
    }

    /// Oversell is rejected and leaves the quantity unchanged
    #[test]
    fn test_oversell_rejected() {
        let mut ledger = LedgerModel::new(5);
        let result = ledger.apply(MovementKind::Sale, 10);

        assert!(result.is_err());
        assert_eq!(ledger.quantity, 5);
        assert_eq!(ledger.delta_sum(), 0);
    }

    /// The sufficiency check reports the available quantity
    #[test]
    fn test_remaining_after_removal() {
        assert_eq!(remaining_after_removal(50, 45), Some(5));
        assert_eq!(remaining_after_removal(5, 5), Some(0));
        assert_eq!(remaining_after_removal(5, 10), None);
        assert_eq!(remaining_after_removal(0, 1), None);
    }

    /// Purchase increases stock and computes the total amount
    #[test]
    fn test_purchase_increases_stock() {
        let mut ledger = LedgerModel::new(20);
        let (previous, new) = ledger.apply(MovementKind::Purchase, 100).unwrap();

        assert_eq!(previous, 20);
        assert_eq!(new, 120);
        assert_eq!(total_amount(100, dec("1.20")), dec("120.00"));
    }

    /// A purchase with expiry today (or earlier) is rejected before any mutation
    #[test]
    fn test_purchase_expiry_must_be_future() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        assert!(validate_expiry_date(today, today).is_err());
        assert!(validate_expiry_date(today.pred_opt().unwrap(), today).is_err());
        assert!(validate_expiry_date(today.succ_opt().unwrap(), today).is_ok());
    }

    /// Expiry write-off drives the quantity to zero, not below
    #[test]
    fn test_expired_write_off_to_zero() {
        let mut ledger = LedgerModel::new(20);
        let (previous, new) = ledger.apply(MovementKind::Expired, 20).unwrap();

        assert_eq!(previous, 20);
        assert_eq!(new, 0);
        assert_eq!(ledger.deltas, vec![-20]);

        // the next write-off has nothing left to remove
        assert!(ledger.apply(MovementKind::Expired, 1).is_err());
    }

    /// Purchases are the only inbound kind
    #[test]
    fn test_signed_delta_per_kind() {
        assert_eq!(MovementKind::Purchase.signed_delta(10), 10);
        assert_eq!(MovementKind::Sale.signed_delta(10), -10);
        assert_eq!(MovementKind::Adjustment.signed_delta(10), -10);
        assert_eq!(MovementKind::Expired.signed_delta(10), -10);
        assert_eq!(MovementKind::Damaged.signed_delta(10), -10);
    }

    /// Adjustment kinds map onto their movement kinds, with no path to
    /// sale or purchase
    #[test]
    fn test_adjustment_kind_mapping() {
        assert_eq!(
            AdjustmentKind::Adjustment.movement_kind(),
            MovementKind::Adjustment
        );
        assert_eq!(AdjustmentKind::Expired.movement_kind(), MovementKind::Expired);
        assert_eq!(AdjustmentKind::Damaged.movement_kind(), MovementKind::Damaged);
    }

    /// Kind names round-trip through their wire representation
    #[test]
    fn test_movement_kind_round_trip() {
        for kind in [
            MovementKind::Sale,
            MovementKind::Purchase,
            MovementKind::Adjustment,
            MovementKind::Expired,
            MovementKind::Damaged,
        ] {
            assert_eq!(MovementKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(MovementKind::from_str("transfer"), None);
    }

    /// Zero and negative magnitudes are rejected for every kind
    #[test]
    fn test_non_positive_quantity_rejected() {
        assert!(validate_movement_quantity(0).is_err());
        assert!(validate_movement_quantity(-5).is_err());
        assert!(validate_movement_quantity(1).is_ok());
    }

    /// Negative unit prices are rejected, zero is allowed
    #[test]
    fn test_unit_price_validation() {
        assert!(validate_unit_price(dec("-0.01")).is_err());
        assert!(validate_unit_price(Decimal::ZERO).is_ok());
        assert!(validate_unit_price(dec("12.50")).is_ok());
    }

    /// Adjustment reasons must carry content
    #[test]
    fn test_reason_validation() {
        assert!(validate_reason("").is_err());
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason("Past expiry").is_ok());
    }

    /// Every applied movement satisfies new = previous + signed delta
    #[test]
    fn test_snapshot_arithmetic() {
        let mut ledger = LedgerModel::new(30);
        let steps = [
            (MovementKind::Purchase, 70),
            (MovementKind::Sale, 25),
            (MovementKind::Damaged, 5),
            (MovementKind::Adjustment, 10),
        ];

        for (kind, magnitude) in steps {
            let (previous, new) = ledger.apply(kind, magnitude).unwrap();
            assert_eq!(new, previous + kind.signed_delta(magnitude));
        }

        assert_eq!(ledger.quantity, 30 + 70 - 25 - 5 - 10);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating movement kinds
    fn kind_strategy() -> impl Strategy<Value = MovementKind> {
        prop_oneof![
            Just(MovementKind::Sale),
            Just(MovementKind::Purchase),
            Just(MovementKind::Adjustment),
            Just(MovementKind::Expired),
            Just(MovementKind::Damaged),
        ]
    }

    /// Strategy for movement magnitudes, including invalid ones
    fn magnitude_strategy() -> impl Strategy<Value = i32> {
        -10i32..200i32
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Ledger/log consistency: after every step the on-hand quantity
        /// equals the baseline plus the sum of all recorded deltas, and a
        /// rejected movement records nothing.
        #[test]
        fn prop_ledger_equals_baseline_plus_deltas(
            initial in 0i32..500,
            ops in prop::collection::vec((kind_strategy(), magnitude_strategy()), 1..40)
        ) {
            let mut ledger = LedgerModel::new(initial);

            for (kind, magnitude) in ops {
                let before = ledger.quantity;
                let logged_before = ledger.deltas.len();

                match ledger.apply(kind, magnitude) {
                    Ok((previous, new)) => {
                        prop_assert_eq!(previous, before);
                        prop_assert_eq!(new, before + kind.signed_delta(magnitude));
                        prop_assert_eq!(ledger.deltas.len(), logged_before + 1);
                    }
                    Err(_) => {
                        // all-or-nothing: no ledger change, no log entry
                        prop_assert_eq!(ledger.quantity, before);
                        prop_assert_eq!(ledger.deltas.len(), logged_before);
                    }
                }

                prop_assert!(ledger.quantity >= 0);
                prop_assert_eq!(ledger.quantity, ledger.baseline + ledger.delta_sum());
            }
        }

        /// The sufficiency check never yields a negative remainder and
        /// fails exactly when the request exceeds the on-hand quantity
        #[test]
        fn prop_removal_never_negative(on_hand in 0i32..1000, requested in 0i32..1000) {
            match remaining_after_removal(on_hand, requested) {
                Some(remaining) => {
                    prop_assert!(requested <= on_hand);
                    prop_assert_eq!(remaining, on_hand - requested);
                    prop_assert!(remaining >= 0);
                }
                None => prop_assert!(requested > on_hand),
            }
        }

        /// Total amount scales linearly with the magnitude
        #[test]
        fn prop_total_amount(quantity in 1i32..10000, cents in 0i64..100000) {
            let unit_price = Decimal::new(cents, 2);
            prop_assert_eq!(
                total_amount(quantity, unit_price),
                unit_price * Decimal::from(quantity)
            );
        }
    }
}

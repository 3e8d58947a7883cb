//! Stock alert tests
//!
//! Tests for the alert classification rules:
//! - low stock at or below the configured threshold
//! - expiring-soon window with inclusive bounds
//! - expired strictly before today
//! - every medication lands in exactly one expiry bucket per snapshot

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use shared::validation::{expiry_status, is_low_stock, ExpiryStatus};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    const WINDOW: i64 = 30;

    /// Low stock triggers at the threshold, not above it
    #[test]
    fn test_low_stock_boundary() {
        assert!(is_low_stock(0, 10));
        assert!(is_low_stock(10, 10));
        assert!(!is_low_stock(11, 10));
    }

    /// Zero-threshold medications alert only when fully out of stock
    #[test]
    fn test_zero_threshold() {
        assert!(is_low_stock(0, 0));
        assert!(!is_low_stock(1, 0));
    }

    /// Both window bounds are inclusive: today and today+30 count as
    /// expiring soon, today+31 does not
    #[test]
    fn test_expiring_soon_window_bounds() {
        let today = day(2025, 6, 1);

        assert_eq!(expiry_status(today, today, WINDOW), ExpiryStatus::ExpiringSoon);
        assert_eq!(
            expiry_status(today + Duration::days(WINDOW), today, WINDOW),
            ExpiryStatus::ExpiringSoon
        );
        assert_eq!(
            expiry_status(today + Duration::days(WINDOW + 1), today, WINDOW),
            ExpiryStatus::Ok
        );
    }

    /// Expired means strictly before today
    #[test]
    fn test_expired_strictly_before_today() {
        let today = day(2025, 6, 1);

        assert_eq!(
            expiry_status(today - Duration::days(1), today, WINDOW),
            ExpiryStatus::Expired
        );
        assert_ne!(expiry_status(today, today, WINDOW), ExpiryStatus::Expired);
    }

    /// The window length follows the configured value
    #[test]
    fn test_configurable_window() {
        let today = day(2025, 6, 1);
        let expiry = today + Duration::days(10);

        assert_eq!(expiry_status(expiry, today, 7), ExpiryStatus::Ok);
        assert_eq!(expiry_status(expiry, today, 10), ExpiryStatus::ExpiringSoon);
    }

    /// Partitioning a snapshot: each medication lands in exactly one
    /// expiry bucket, and the expiring set sorts by expiry ascending
    #[test]
    fn test_snapshot_partition() {
        let today = day(2025, 6, 1);
        let expiries = [
            today - Duration::days(40),
            today + Duration::days(25),
            today + Duration::days(3),
            today - Duration::days(1),
            today + Duration::days(90),
        ];

        let mut expiring: Vec<NaiveDate> = Vec::new();
        let mut expired = 0;
        let mut ok = 0;

        for expiry in expiries {
            match expiry_status(expiry, today, WINDOW) {
                ExpiryStatus::ExpiringSoon => expiring.push(expiry),
                ExpiryStatus::Expired => expired += 1,
                ExpiryStatus::Ok => ok += 1,
            }
        }

        assert_eq!(expiring.len(), 2);
        assert_eq!(expired, 2);
        assert_eq!(ok, 1);

        expiring.sort();
        assert_eq!(expiring[0], today + Duration::days(3));
        assert_eq!(expiring[1], today + Duration::days(25));
    }

    /// A medication can be low on stock and expired at the same time;
    /// the two classifications are independent
    #[test]
    fn test_low_stock_and_expiry_independent() {
        let today = day(2025, 6, 1);
        let expiry = today - Duration::days(5);

        assert!(is_low_stock(3, 10));
        assert_eq!(expiry_status(expiry, today, WINDOW), ExpiryStatus::Expired);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..4000).prop_map(|offset| day(2020, 1, 1) + Duration::days(offset))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Classification is total and matches the date comparisons that
        /// define it
        #[test]
        fn prop_expiry_classification_consistent(
            expiry in date_strategy(),
            today in date_strategy(),
            window in 0i64..120
        ) {
            match expiry_status(expiry, today, window) {
                ExpiryStatus::Expired => prop_assert!(expiry < today),
                ExpiryStatus::ExpiringSoon => {
                    prop_assert!(expiry >= today);
                    prop_assert!(expiry <= today + Duration::days(window));
                }
                ExpiryStatus::Ok => prop_assert!(expiry > today + Duration::days(window)),
            }
        }

        /// Low stock is monotone: adding stock never creates an alert
        #[test]
        fn prop_low_stock_monotone(quantity in 0i32..1000, threshold in 0i32..1000) {
            if is_low_stock(quantity + 1, threshold) {
                prop_assert!(is_low_stock(quantity, threshold));
            }
        }
    }
}

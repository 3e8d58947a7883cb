//! Medication catalog and pagination tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::types::{Pagination, PaginationMeta};
use shared::validation::{validate_non_negative, validate_required_text, validate_unit_price};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Required text fields reject empty and whitespace-only values
    #[test]
    fn test_required_text() {
        assert!(validate_required_text("").is_err());
        assert!(validate_required_text("  \t").is_err());
        assert!(validate_required_text("Paracetamol 500mg").is_ok());
    }

    /// Initial quantity and threshold may be zero but not negative
    #[test]
    fn test_non_negative_fields() {
        assert!(validate_non_negative(-1).is_err());
        assert!(validate_non_negative(0).is_ok());
        assert!(validate_non_negative(250).is_ok());
    }

    /// Free medications are allowed, negative prices are not
    #[test]
    fn test_price_bounds() {
        assert!(validate_unit_price(Decimal::ZERO).is_ok());
        assert!(validate_unit_price(dec("0.50")).is_ok());
        assert!(validate_unit_price(dec("-1")).is_err());
    }

    /// Defaults: first page, twenty per page
    #[test]
    fn test_pagination_defaults() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.per_page, 20);
        assert_eq!(pagination.offset(), 0);
        assert_eq!(pagination.limit(), 20);
    }

    /// Page 0 and oversized per_page are clamped
    #[test]
    fn test_pagination_clamping() {
        let pagination = Pagination {
            page: 0,
            per_page: 5000,
        };
        let normalized = pagination.normalized();

        assert_eq!(normalized.page, 1);
        assert_eq!(normalized.per_page, Pagination::MAX_PER_PAGE);
        assert_eq!(pagination.offset(), 0);
    }

    /// Offset skips the preceding pages
    #[test]
    fn test_pagination_offset() {
        let pagination = Pagination {
            page: 3,
            per_page: 25,
        };
        assert_eq!(pagination.offset(), 50);
        assert_eq!(pagination.limit(), 25);
    }

    /// total_pages rounds up and survives a zero-item result
    #[test]
    fn test_pagination_meta() {
        let pagination = Pagination {
            page: 1,
            per_page: 20,
        };

        assert_eq!(PaginationMeta::new(pagination, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(pagination, 1).total_pages, 1);
        assert_eq!(PaginationMeta::new(pagination, 20).total_pages, 1);
        assert_eq!(PaginationMeta::new(pagination, 21).total_pages, 2);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Offsets advance by exactly one page width and never go negative
        #[test]
        fn prop_pagination_offset(page in 0u32..10000, per_page in 0u32..500) {
            let pagination = Pagination { page, per_page };
            let normalized = pagination.normalized();

            prop_assert!(pagination.offset() >= 0);
            prop_assert_eq!(
                pagination.offset(),
                i64::from(normalized.page - 1) * i64::from(normalized.per_page)
            );
            prop_assert!(normalized.per_page >= 1);
            prop_assert!(normalized.per_page <= Pagination::MAX_PER_PAGE);
        }

        /// total_pages is the smallest page count that covers every item
        #[test]
        fn prop_pagination_meta_covers_items(total_items in 0u64..100000, per_page in 1u32..200) {
            let pagination = Pagination { page: 1, per_page };
            let meta = PaginationMeta::new(pagination, total_items);

            let capacity = u64::from(meta.total_pages) * u64::from(meta.per_page);
            prop_assert!(capacity >= total_items);
            if meta.total_pages > 0 {
                let one_less = u64::from(meta.total_pages - 1) * u64::from(meta.per_page);
                prop_assert!(one_less < total_items);
            }
        }
    }
}

//! Ticket status machine tests
//!
//! The transition tables are enforced both ways: every transition in the
//! table succeeds, every transition outside it (including self-loops on
//! terminal statuses) is rejected.

use proptest::prelude::*;

use shared::models::{
    DetailStatus, ProductionDetailStatus, PurchasingDetailStatus, SaleOrderStatus,
};

const PRODUCTION: &[ProductionDetailStatus] = &[
    ProductionDetailStatus::New,
    ProductionDetailStatus::Approval,
    ProductionDetailStatus::Complete,
    ProductionDetailStatus::Ready,
    ProductionDetailStatus::Closed,
    ProductionDetailStatus::Cancelled,
];

const PURCHASING: &[PurchasingDetailStatus] = &[
    PurchasingDetailStatus::New,
    PurchasingDetailStatus::Approval,
    PurchasingDetailStatus::Successful,
    PurchasingDetailStatus::Shipping,
    PurchasingDetailStatus::Ready,
    PurchasingDetailStatus::Closed,
    PurchasingDetailStatus::Cancelled,
];

const SALE: &[SaleOrderStatus] = &[
    SaleOrderStatus::New,
    SaleOrderStatus::Allocated,
    SaleOrderStatus::Packed,
    SaleOrderStatus::Shipped,
    SaleOrderStatus::Done,
    SaleOrderStatus::Cancelled,
];

/// Check the full transition matrix of a family against an expected set.
fn assert_table<S: DetailStatus + std::fmt::Debug>(all: &[S], expected: &[(S, S)]) {
    for &from in all {
        for &to in all {
            let allowed = expected.iter().any(|&(f, t)| f == from && t == to);
            assert_eq!(
                from.can_transition_to(to),
                allowed,
                "transition {:?} -> {:?}",
                from,
                to
            );
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_production_transition_table() {
        use ProductionDetailStatus::*;
        assert_table(
            PRODUCTION,
            &[
                (New, Approval),
                (New, Cancelled),
                (Approval, Complete),
                (Approval, Cancelled),
                (Complete, Ready),
                (Ready, Closed),
            ],
        );
    }

    #[test]
    fn test_purchasing_transition_table() {
        use PurchasingDetailStatus::*;
        assert_table(
            PURCHASING,
            &[
                (New, Approval),
                (New, Cancelled),
                (Approval, Successful),
                (Approval, Cancelled),
                (Successful, Shipping),
                (Shipping, Ready),
                (Ready, Closed),
            ],
        );
    }

    #[test]
    fn test_sale_order_transition_table() {
        use SaleOrderStatus::*;
        assert_table(
            SALE,
            &[
                (New, Allocated),
                (New, Cancelled),
                (Allocated, Packed),
                (Allocated, Cancelled),
                (Packed, Shipped),
                (Shipped, Done),
            ],
        );
    }

    /// Terminal statuses reject all further transitions, including self-loops
    #[test]
    fn test_terminal_statuses_reject_everything() {
        assert!(ProductionDetailStatus::Closed.is_terminal());
        assert!(ProductionDetailStatus::Cancelled.is_terminal());
        assert!(PurchasingDetailStatus::Closed.is_terminal());
        assert!(PurchasingDetailStatus::Cancelled.is_terminal());
        assert!(SaleOrderStatus::Done.is_terminal());
        assert!(SaleOrderStatus::Cancelled.is_terminal());

        for &to in PRODUCTION {
            assert!(!ProductionDetailStatus::Closed.can_transition_to(to));
            assert!(!ProductionDetailStatus::Cancelled.can_transition_to(to));
        }
        for &to in SALE {
            assert!(!SaleOrderStatus::Done.can_transition_to(to));
        }
    }

    /// Terminal success excludes cancellation
    #[test]
    fn test_terminal_success_classification() {
        assert!(ProductionDetailStatus::Closed.is_terminal_success());
        assert!(!ProductionDetailStatus::Cancelled.is_terminal_success());
        assert!(!ProductionDetailStatus::Complete.is_terminal_success());
        assert!(PurchasingDetailStatus::Closed.is_terminal_success());
        assert!(SaleOrderStatus::Done.is_terminal_success());
        assert!(!SaleOrderStatus::Shipped.is_terminal_success());
    }

    /// Every detail starts at NEW
    #[test]
    fn test_initial_statuses() {
        assert_eq!(ProductionDetailStatus::INITIAL, ProductionDetailStatus::New);
        assert_eq!(PurchasingDetailStatus::INITIAL, PurchasingDetailStatus::New);
        assert_eq!(SaleOrderStatus::INITIAL, SaleOrderStatus::New);
    }

    /// String round-trips; unknown values are rejected at the boundary
    #[test]
    fn test_parse_round_trip() {
        for &s in PRODUCTION {
            assert_eq!(ProductionDetailStatus::parse(s.as_str()), Some(s));
        }
        for &s in PURCHASING {
            assert_eq!(PurchasingDetailStatus::parse(s.as_str()), Some(s));
        }
        for &s in SALE {
            assert_eq!(SaleOrderStatus::parse(s.as_str()), Some(s));
        }

        assert_eq!(ProductionDetailStatus::parse("unknown"), None);
        assert_eq!(ProductionDetailStatus::parse("NEW"), None);
        assert_eq!(PurchasingDetailStatus::parse("allocated"), None);
        assert_eq!(SaleOrderStatus::parse("approval"), None);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    fn production_strategy() -> impl Strategy<Value = ProductionDetailStatus> {
        proptest::sample::select(PRODUCTION.to_vec())
    }

    fn sale_strategy() -> impl Strategy<Value = SaleOrderStatus> {
        proptest::sample::select(SALE.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A transition is allowed iff it appears in the source's table
        #[test]
        fn prop_transition_matches_table(
            from in production_strategy(),
            to in production_strategy()
        ) {
            prop_assert_eq!(
                from.can_transition_to(to),
                from.allowed_transitions().contains(&to)
            );
        }

        /// Terminal statuses allow nothing; non-terminal statuses allow
        /// at least one transition
        #[test]
        fn prop_terminal_iff_empty_table(status in sale_strategy()) {
            if status.is_terminal() {
                prop_assert!(status.allowed_transitions().is_empty());
            } else {
                prop_assert!(!status.allowed_transitions().is_empty());
            }
        }

        /// No status can transition to itself in any family
        #[test]
        fn prop_no_self_loops(status in production_strategy()) {
            prop_assert!(!status.can_transition_to(status));
        }
    }
}

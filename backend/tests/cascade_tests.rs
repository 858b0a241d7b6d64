//! Parent-status cascade tests
//!
//! A ticket's status is always a pure function of its detail statuses;
//! these tests pin the priority rules.

use proptest::prelude::*;

use shared::models::{
    derive_parent_status, DetailStatus, ProductionDetailStatus, PurchasingDetailStatus,
    SaleOrderStatus, TicketStatus,
};

#[cfg(test)]
mod unit_tests {
    use super::*;
    use ProductionDetailStatus::*;

    #[test]
    fn test_all_cancelled() {
        assert_eq!(
            derive_parent_status(&[Cancelled, Cancelled]),
            TicketStatus::Cancelled
        );
    }

    #[test]
    fn test_all_finished() {
        assert_eq!(derive_parent_status(&[Closed, Closed]), TicketStatus::Complete);
    }

    #[test]
    fn test_finished_plus_cancelled() {
        assert_eq!(
            derive_parent_status(&[Closed, Cancelled]),
            TicketStatus::PartialCancelled
        );
        assert_eq!(
            derive_parent_status(&[Closed, Closed, Cancelled]),
            TicketStatus::PartialCancelled
        );
    }

    #[test]
    fn test_some_finished_none_cancelled() {
        assert_eq!(
            derive_parent_status(&[New, Closed]),
            TicketStatus::PartialComplete
        );
        assert_eq!(
            derive_parent_status(&[Approval, Ready, Closed]),
            TicketStatus::PartialComplete
        );
    }

    #[test]
    fn test_all_new() {
        assert_eq!(derive_parent_status(&[New, New, New]), TicketStatus::New);
    }

    #[test]
    fn test_mixed_in_flight() {
        assert_eq!(
            derive_parent_status(&[New, Approval]),
            TicketStatus::InProgress
        );
        // A cancelled detail next to an in-flight one is still in progress
        // until the in-flight ones resolve.
        assert_eq!(
            derive_parent_status(&[Cancelled, Approval]),
            TicketStatus::InProgress
        );
        assert_eq!(
            derive_parent_status(&[Cancelled, Closed, Complete]),
            TicketStatus::InProgress
        );
    }

    #[test]
    fn test_single_detail() {
        assert_eq!(derive_parent_status(&[New]), TicketStatus::New);
        assert_eq!(derive_parent_status(&[Approval]), TicketStatus::InProgress);
        assert_eq!(derive_parent_status(&[Closed]), TicketStatus::Complete);
        assert_eq!(derive_parent_status(&[Cancelled]), TicketStatus::Cancelled);
    }

    /// Non-terminal COMPLETE does not count as finished for the cascade
    #[test]
    fn test_complete_is_not_terminal_success() {
        assert_eq!(
            derive_parent_status(&[Complete, Complete]),
            TicketStatus::InProgress
        );
    }

    #[test]
    fn test_other_families() {
        assert_eq!(
            derive_parent_status(&[
                PurchasingDetailStatus::Closed,
                PurchasingDetailStatus::Cancelled
            ]),
            TicketStatus::PartialCancelled
        );
        assert_eq!(
            derive_parent_status(&[SaleOrderStatus::Done, SaleOrderStatus::New]),
            TicketStatus::PartialComplete
        );
        assert_eq!(
            derive_parent_status(&[SaleOrderStatus::Allocated, SaleOrderStatus::Packed]),
            TicketStatus::InProgress
        );
    }

    /// Degenerate case: no details derives NEW
    #[test]
    fn test_empty_detail_set() {
        let none: [ProductionDetailStatus; 0] = [];
        assert_eq!(derive_parent_status(&none), TicketStatus::New);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    const ALL: &[ProductionDetailStatus] = &[
        ProductionDetailStatus::New,
        ProductionDetailStatus::Approval,
        ProductionDetailStatus::Complete,
        ProductionDetailStatus::Ready,
        ProductionDetailStatus::Closed,
        ProductionDetailStatus::Cancelled,
    ];

    fn statuses_strategy() -> impl Strategy<Value = Vec<ProductionDetailStatus>> {
        prop::collection::vec(proptest::sample::select(ALL.to_vec()), 1..12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        /// The parent is CANCELLED exactly when every detail is cancelled
        #[test]
        fn prop_cancelled_iff_all_cancelled(statuses in statuses_strategy()) {
            let all_cancelled = statuses.iter().all(|s| s.is_cancelled());
            prop_assert_eq!(
                derive_parent_status(&statuses) == TicketStatus::Cancelled,
                all_cancelled
            );
        }

        /// The parent is COMPLETE exactly when every detail finished
        #[test]
        fn prop_complete_iff_all_finished(statuses in statuses_strategy()) {
            let all_finished = statuses.iter().all(|s| s.is_terminal_success());
            prop_assert_eq!(
                derive_parent_status(&statuses) == TicketStatus::Complete,
                all_finished
            );
        }

        /// PARTIAL_CANCELLED requires at least one cancelled detail and the
        /// rest finished
        #[test]
        fn prop_partial_cancelled_shape(statuses in statuses_strategy()) {
            if derive_parent_status(&statuses) == TicketStatus::PartialCancelled {
                prop_assert!(statuses.iter().any(|s| s.is_cancelled()));
                prop_assert!(statuses.iter().any(|s| s.is_terminal_success()));
                prop_assert!(statuses
                    .iter()
                    .all(|s| s.is_cancelled() || s.is_terminal_success()));
            }
        }

        /// PARTIAL_COMPLETE never coexists with a cancelled detail
        #[test]
        fn prop_partial_complete_excludes_cancelled(statuses in statuses_strategy()) {
            if derive_parent_status(&statuses) == TicketStatus::PartialComplete {
                prop_assert!(!statuses.iter().any(|s| s.is_cancelled()));
                prop_assert!(statuses.iter().any(|s| s.is_terminal_success()));
            }
        }

        /// The derivation is total: every multiset yields exactly one of the
        /// six parent statuses, and it is order-independent
        #[test]
        fn prop_total_and_order_independent(statuses in statuses_strategy()) {
            let parent = derive_parent_status(&statuses);
            let mut reversed = statuses.clone();
            reversed.reverse();
            prop_assert_eq!(derive_parent_status(&reversed), parent);
        }
    }
}

//! Bulk operation report tests
//!
//! Bulk calls are advisory: every id in the request lands in exactly one of
//! the two result lists, and the totals always add up.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{InventoryStatus, StockRecord, StockTransaction};
use shared::types::{BulkInitReport, BulkTransactionReport};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_record(sku: &str) -> StockRecord {
    StockRecord {
        id: Uuid::new_v4(),
        business_id: Uuid::new_v4(),
        ledger_kind: "product".to_string(),
        variant_sku: sku.to_string(),
        current_stock: dec("50"),
        allocated_stock: Decimal::ZERO,
        future_stock: Decimal::ZERO,
        min_alert_stock: dec("10"),
        max_stock_level: Some(dec("100")),
        status: InventoryStatus::InStock,
        is_active: true,
        created_by: Uuid::new_v4(),
        created_by_role: "warehouse_manager".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_transaction(id: i64) -> StockTransaction {
    StockTransaction {
        id,
        stock_record_id: Uuid::new_v4(),
        transaction_type: "in".to_string(),
        quantity: dec("10"),
        previous_stock: dec("5"),
        new_stock: dec("15"),
        note: None,
        reference_document_type: None,
        reference_document_id: None,
        transaction_source: "manual_adjustment".to_string(),
        created_by: Uuid::new_v4(),
        created_by_role: "warehouse_manager".to_string(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let report = BulkTransactionReport::new();
        assert_eq!(report.total_processed, 0);
        assert_eq!(report.success_count, 0);
        assert_eq!(report.failure_count, 0);
        assert!(report.successful_transactions.is_empty());
        assert!(report.failed_transactions.is_empty());
    }

    #[test]
    fn test_mixed_outcomes() {
        let mut report = BulkTransactionReport::new();
        report.record_success(sample_transaction(1));
        report.record_failure(Uuid::new_v4(), "NOT_FOUND", "Stock record not found".to_string());
        report.record_success(sample_transaction(2));

        assert_eq!(report.total_processed, 3);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.failed_transactions[0].error_code, "NOT_FOUND");
    }

    /// Spec scenario: bulk add over [v1, v2, v3] where v2 does not exist
    #[test]
    fn test_one_missing_variant() {
        let v2 = Uuid::new_v4();
        let mut report = BulkTransactionReport::new();
        report.record_success(sample_transaction(1));
        report.record_failure(v2, "NOT_FOUND", "Stock record not found".to_string());
        report.record_success(sample_transaction(2));

        assert_eq!(report.total_processed, 3);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.failed_transactions[0].variant_id, v2);
    }

    #[test]
    fn test_init_report_distinct_already_exists() {
        let mut report = BulkInitReport::new();
        report.record_failure("SKU-1", "ALREADY_EXISTS", "Stock record for SKU SKU-1 already exists".to_string());
        report.record_failure("SKU-2", "VALIDATION_ERROR", "SKU cannot be empty".to_string());

        assert_eq!(report.total_processed, 2);
        assert_eq!(report.failure_count, 2);
        assert_eq!(report.failed_inits[0].error_code, "ALREADY_EXISTS");
        assert_eq!(report.failed_inits[1].error_code, "VALIDATION_ERROR");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any partition of N items into valid/invalid, the report shows
        /// success = N - k, failures = k, total = N
        #[test]
        fn prop_partition_counts(outcomes in prop::collection::vec(any::<bool>(), 1..50)) {
            let mut report = BulkTransactionReport::new();
            let mut next_id = 0i64;
            for ok in &outcomes {
                if *ok {
                    next_id += 1;
                    report.record_success(sample_transaction(next_id));
                } else {
                    report.record_failure(
                        Uuid::new_v4(),
                        "INSUFFICIENT_STOCK",
                        "Insufficient stock".to_string(),
                    );
                }
            }

            let n = outcomes.len();
            let k = outcomes.iter().filter(|ok| !**ok).count();
            prop_assert_eq!(report.total_processed, n);
            prop_assert_eq!(report.success_count, n - k);
            prop_assert_eq!(report.failure_count, k);
            prop_assert_eq!(report.successful_transactions.len(), n - k);
            prop_assert_eq!(report.failed_transactions.len(), k);
        }

        /// The two lists together always account for every processed item
        #[test]
        fn prop_lists_sum_to_total(outcomes in prop::collection::vec(any::<bool>(), 0..50)) {
            let mut report = BulkInitReport::new();
            for (i, ok) in outcomes.iter().enumerate() {
                let sku = format!("SKU-{}", i);
                if *ok {
                    report.record_success(sample_record(&sku));
                } else {
                    report.record_failure(&sku, "ALREADY_EXISTS", "exists".to_string());
                }
            }
            prop_assert_eq!(
                report.success_count + report.failure_count,
                report.total_processed
            );
        }
    }
}

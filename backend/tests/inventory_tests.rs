//! Stock ledger tests
//!
//! Tests for the threshold classifier and the ledger mutation semantics:
//! - Classification is total and mutually exclusive
//! - add/subtract/set arithmetic and the append-only history
//! - INSUFFICIENT_STOCK leaves the ledger unchanged

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{InventoryStatus, TransactionType};
use shared::validation::{validate_quantity_non_negative, validate_quantity_positive};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// In-memory mirror of one ledger record, applying the same rules the
/// service enforces per row-locked transaction.
struct LedgerSim {
    current: Decimal,
    min_alert: Decimal,
    max_level: Option<Decimal>,
    history: Vec<(TransactionType, Decimal, Decimal, Decimal)>,
}

impl LedgerSim {
    fn init(current: Decimal, min_alert: Decimal, max_level: Option<Decimal>) -> Self {
        Self {
            current,
            min_alert,
            max_level,
            history: Vec::new(),
        }
    }

    fn status(&self) -> InventoryStatus {
        InventoryStatus::classify(self.current, self.min_alert, self.max_level)
    }

    fn apply(&mut self, op: TransactionType, quantity: Decimal) -> Result<(), &'static str> {
        match op {
            TransactionType::Set => validate_quantity_non_negative(quantity)?,
            _ => validate_quantity_positive(quantity)?,
        }
        let previous = self.current;
        let new = match op {
            TransactionType::In => previous + quantity,
            TransactionType::Out => {
                if quantity > previous {
                    return Err("Insufficient stock");
                }
                previous - quantity
            }
            TransactionType::Set => quantity,
        };
        self.history.push((op, quantity, previous, new));
        self.current = new;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Classification priority: out-of-stock wins over low-stock
    #[test]
    fn test_classify_out_of_stock() {
        assert_eq!(
            InventoryStatus::classify(Decimal::ZERO, dec("10"), Some(dec("100"))),
            InventoryStatus::OutOfStock
        );
        assert_eq!(
            InventoryStatus::classify(dec("-3"), dec("10"), Some(dec("100"))),
            InventoryStatus::OutOfStock
        );
    }

    #[test]
    fn test_classify_low_stock() {
        assert_eq!(
            InventoryStatus::classify(dec("10"), dec("10"), Some(dec("100"))),
            InventoryStatus::LowStock
        );
        assert_eq!(
            InventoryStatus::classify(dec("0.5"), dec("10"), Some(dec("100"))),
            InventoryStatus::LowStock
        );
    }

    #[test]
    fn test_classify_in_stock() {
        assert_eq!(
            InventoryStatus::classify(dec("50"), dec("10"), Some(dec("100"))),
            InventoryStatus::InStock
        );
    }

    #[test]
    fn test_classify_over_stock() {
        assert_eq!(
            InventoryStatus::classify(dec("100"), dec("10"), Some(dec("100"))),
            InventoryStatus::OverStock
        );
        assert_eq!(
            InventoryStatus::classify(dec("150"), dec("10"), Some(dec("100"))),
            InventoryStatus::OverStock
        );
    }

    /// Without a maximum level the over-stock band is disabled
    #[test]
    fn test_classify_no_maximum() {
        assert_eq!(
            InventoryStatus::classify(dec("1000000"), dec("10"), None),
            InventoryStatus::InStock
        );
    }

    /// Add: new stock is previous plus quantity, status follows
    #[test]
    fn test_add_updates_stock_and_status() {
        let mut ledger = LedgerSim::init(dec("5"), dec("10"), Some(dec("100")));
        assert_eq!(ledger.status(), InventoryStatus::LowStock);

        ledger.apply(TransactionType::In, dec("45")).unwrap();
        assert_eq!(ledger.current, dec("50"));
        assert_eq!(ledger.status(), InventoryStatus::InStock);

        let (_, qty, previous, new) = ledger.history[0];
        assert_eq!(new, previous + qty);
    }

    /// Subtract below zero fails and writes no history entry
    #[test]
    fn test_subtract_insufficient_leaves_stock_unchanged() {
        let mut ledger = LedgerSim::init(dec("50"), dec("10"), Some(dec("100")));

        assert!(ledger.apply(TransactionType::Out, dec("60")).is_err());
        assert_eq!(ledger.current, dec("50"));
        assert!(ledger.history.is_empty());
    }

    /// Spec scenario: init 50 (min 10, max 100), subtract 45 -> 5 / low
    /// stock; subtract 10 fails and the ledger stays at 5.
    #[test]
    fn test_subtract_scenario() {
        let mut ledger = LedgerSim::init(dec("50"), dec("10"), Some(dec("100")));

        ledger.apply(TransactionType::Out, dec("45")).unwrap();
        assert_eq!(ledger.current, dec("5"));
        assert_eq!(ledger.status(), InventoryStatus::LowStock);

        assert!(ledger.apply(TransactionType::Out, dec("10")).is_err());
        assert_eq!(ledger.current, dec("5"));
        assert_eq!(ledger.history.len(), 1);
    }

    /// Set is idempotent in value but not in history
    #[test]
    fn test_set_idempotent_in_value_not_history() {
        let mut ledger = LedgerSim::init(dec("20"), dec("10"), Some(dec("100")));

        ledger.apply(TransactionType::Set, dec("30")).unwrap();
        ledger.apply(TransactionType::Set, dec("30")).unwrap();

        assert_eq!(ledger.current, dec("30"));
        assert_eq!(ledger.history.len(), 2);
        let (_, _, previous, new) = ledger.history[1];
        assert_eq!(previous, dec("30"));
        assert_eq!(new, dec("30"));
    }

    /// Set accepts zero, add and subtract do not
    #[test]
    fn test_quantity_validation_per_operation() {
        let mut ledger = LedgerSim::init(dec("20"), dec("10"), None);

        assert!(ledger.apply(TransactionType::Set, Decimal::ZERO).is_ok());
        assert!(ledger.apply(TransactionType::In, Decimal::ZERO).is_err());
        assert!(ledger.apply(TransactionType::Out, Decimal::ZERO).is_err());
        assert!(ledger.apply(TransactionType::In, dec("-1")).is_err());
    }

    /// History invariants hold for a mixed sequence
    #[test]
    fn test_history_chain() {
        let mut ledger = LedgerSim::init(dec("100"), dec("10"), None);
        ledger.apply(TransactionType::Out, dec("30")).unwrap();
        ledger.apply(TransactionType::In, dec("5")).unwrap();
        ledger.apply(TransactionType::Set, dec("80")).unwrap();

        // Each entry's previous stock equals the prior entry's new stock.
        for pair in ledger.history.windows(2) {
            assert_eq!(pair[0].3, pair[1].2);
        }
        assert_eq!(ledger.current, dec("80"));
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(InventoryStatus::OutOfStock.as_str(), "out_of_stock");
        assert_eq!(InventoryStatus::LowStock.as_str(), "low_stock");
        assert_eq!(InventoryStatus::InStock.as_str(), "in_stock");
        assert_eq!(InventoryStatus::OverStock.as_str(), "over_stock");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for stock quantities including zero and negatives
    fn stock_strategy() -> impl Strategy<Value = Decimal> {
        (-100_000i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for positive quantities
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for a threshold pair with min < max
    fn threshold_strategy() -> impl Strategy<Value = (Decimal, Option<Decimal>)> {
        (0i64..=50_000i64, proptest::option::of(1i64..=50_000i64)).prop_map(|(min, extra)| {
            let min = Decimal::new(min, 2);
            (min, extra.map(|e| min + Decimal::new(e, 2)))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Classification is total: every input maps to exactly one status
        #[test]
        fn prop_classification_total_and_exclusive(
            current in stock_strategy(),
            (min_alert, max_level) in threshold_strategy()
        ) {
            let status = InventoryStatus::classify(current, min_alert, max_level);

            // Recheck the definition band by band.
            let expected = if current <= Decimal::ZERO {
                InventoryStatus::OutOfStock
            } else if current <= min_alert {
                InventoryStatus::LowStock
            } else if max_level.map(|m| current >= m).unwrap_or(false) {
                InventoryStatus::OverStock
            } else {
                InventoryStatus::InStock
            };
            prop_assert_eq!(status, expected);
        }

        /// Priority: non-positive stock is always OUT_OF_STOCK regardless of
        /// thresholds
        #[test]
        fn prop_out_of_stock_wins(
            current in -100_000i64..=0i64,
            (min_alert, max_level) in threshold_strategy()
        ) {
            let current = Decimal::new(current, 2);
            prop_assert_eq!(
                InventoryStatus::classify(current, min_alert, max_level),
                InventoryStatus::OutOfStock
            );
        }

        /// Add arithmetic: new stock equals previous plus quantity
        #[test]
        fn prop_add_arithmetic(
            opening in 0i64..=100_000i64,
            quantity in quantity_strategy()
        ) {
            let opening = Decimal::new(opening, 2);
            let mut ledger = LedgerSim::init(opening, dec("10"), None);
            ledger.apply(TransactionType::In, quantity).unwrap();
            prop_assert_eq!(ledger.current, opening + quantity);
        }

        /// Subtract never drives the ledger below zero: it either succeeds
        /// with the exact difference or fails leaving everything unchanged
        #[test]
        fn prop_subtract_never_negative(
            opening in 0i64..=100_000i64,
            quantity in quantity_strategy()
        ) {
            let opening = Decimal::new(opening, 2);
            let mut ledger = LedgerSim::init(opening, dec("10"), None);
            let result = ledger.apply(TransactionType::Out, quantity);

            if quantity <= opening {
                prop_assert!(result.is_ok());
                prop_assert_eq!(ledger.current, opening - quantity);
                prop_assert_eq!(ledger.history.len(), 1);
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(ledger.current, opening);
                prop_assert!(ledger.history.is_empty());
            }
            prop_assert!(ledger.current >= Decimal::ZERO);
        }

        /// Every successful mutation appends exactly one history entry and
        /// the chain of (previous, new) pairs is contiguous
        #[test]
        fn prop_history_contiguous(
            opening in 0i64..=10_000i64,
            ops in prop::collection::vec(
                (prop_oneof![Just(TransactionType::In), Just(TransactionType::Out), Just(TransactionType::Set)], quantity_strategy()),
                1..20
            )
        ) {
            let opening = Decimal::new(opening, 2);
            let mut ledger = LedgerSim::init(opening, dec("10"), None);
            let mut applied = 0usize;
            for (op, qty) in ops {
                if ledger.apply(op, qty).is_ok() {
                    applied += 1;
                }
            }
            prop_assert_eq!(ledger.history.len(), applied);
            for pair in ledger.history.windows(2) {
                prop_assert_eq!(pair[0].3, pair[1].2);
            }
            if let Some(last) = ledger.history.last() {
                prop_assert_eq!(last.3, ledger.current);
            }
        }
    }
}

//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{StockRecord, StockTransaction, TicketWithDetails};

/// Request-scoped credentials passed into every mutating core call.
///
/// Services never read ambient auth state; the caller supplies the actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: String,
}

impl Actor {
    pub fn new(user_id: Uuid, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }
}

/// One failed item in a bulk transaction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedTransaction {
    pub variant_id: Uuid,
    pub error_code: String,
    pub reason: String,
}

/// Aggregated outcome of a bulk add/subtract/set.
///
/// Always reports `total_processed = success_count + failure_count`; a bulk
/// call is advisory and callers must inspect both lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkTransactionReport {
    pub successful_transactions: Vec<StockTransaction>,
    pub failed_transactions: Vec<FailedTransaction>,
    pub total_processed: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

impl BulkTransactionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, transaction: StockTransaction) {
        self.successful_transactions.push(transaction);
        self.success_count += 1;
        self.total_processed += 1;
    }

    pub fn record_failure(&mut self, variant_id: Uuid, error_code: &str, reason: String) {
        self.failed_transactions.push(FailedTransaction {
            variant_id,
            error_code: error_code.to_string(),
            reason,
        });
        self.failure_count += 1;
        self.total_processed += 1;
    }
}

/// One failed SKU in a bulk init call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedInit {
    pub variant_sku: String,
    pub error_code: String,
    pub reason: String,
}

/// Aggregated outcome of a bulk init keyed by SKU.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkInitReport {
    pub successful_inits: Vec<StockRecord>,
    pub failed_inits: Vec<FailedInit>,
    pub total_processed: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

impl BulkInitReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, record: StockRecord) {
        self.successful_inits.push(record);
        self.success_count += 1;
        self.total_processed += 1;
    }

    pub fn record_failure(&mut self, variant_sku: &str, error_code: &str, reason: String) {
        self.failed_inits.push(FailedInit {
            variant_sku: variant_sku.to_string(),
            error_code: error_code.to_string(),
            reason,
        });
        self.failure_count += 1;
        self.total_processed += 1;
    }
}

/// Aggregated outcome of a bulk ticket creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkCreateReport {
    pub created_tickets: Vec<TicketWithDetails>,
    pub errors: Vec<String>,
    pub total_requested: usize,
    pub total_created: usize,
    pub total_failed: usize,
}

/// Allowed transaction enumerations, exposed as a configuration surface.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionEnums {
    pub reference_document_types: Vec<&'static str>,
    pub transaction_sources: Vec<&'static str>,
}

//! Stock ledger models: records, transactions, and the threshold classifier

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which inventory domain a stock record belongs to.
///
/// Product and material ledgers share the same operations but live in
/// separate record spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Product,
    Material,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Product => "product",
            LedgerKind::Material => "material",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(LedgerKind::Product),
            "material" => Some(LedgerKind::Material),
            _ => None,
        }
    }
}

/// Threshold-derived inventory status.
///
/// Never stored as source of truth; recomputed from the raw quantities on
/// every read and every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    OutOfStock,
    LowStock,
    InStock,
    OverStock,
}

impl InventoryStatus {
    /// Classify current stock against the record's thresholds.
    ///
    /// Priority order: out-of-stock, low-stock, over-stock, in-stock.
    /// A record without a maximum level never reports `OverStock`.
    pub fn classify(
        current: Decimal,
        min_alert: Decimal,
        max_level: Option<Decimal>,
    ) -> InventoryStatus {
        if current <= Decimal::ZERO {
            InventoryStatus::OutOfStock
        } else if current <= min_alert {
            InventoryStatus::LowStock
        } else if max_level.is_some_and(|max| current >= max) {
            InventoryStatus::OverStock
        } else {
            InventoryStatus::InStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::OutOfStock => "out_of_stock",
            InventoryStatus::LowStock => "low_stock",
            InventoryStatus::InStock => "in_stock",
            InventoryStatus::OverStock => "over_stock",
        }
    }
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    In,
    Out,
    Set,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "in",
            TransactionType::Out => "out",
            TransactionType::Set => "set",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(TransactionType::In),
            "out" => Some(TransactionType::Out),
            "set" => Some(TransactionType::Set),
            _ => None,
        }
    }
}

/// Business origin of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    InitialStock,
    ManualAdjustment,
    TicketFulfillment,
    SaleShipment,
    StockCorrection,
}

impl TransactionSource {
    pub const ALL: &'static [TransactionSource] = &[
        TransactionSource::InitialStock,
        TransactionSource::ManualAdjustment,
        TransactionSource::TicketFulfillment,
        TransactionSource::SaleShipment,
        TransactionSource::StockCorrection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSource::InitialStock => "initial_stock",
            TransactionSource::ManualAdjustment => "manual_adjustment",
            TransactionSource::TicketFulfillment => "ticket_fulfillment",
            TransactionSource::SaleShipment => "sale_shipment",
            TransactionSource::StockCorrection => "stock_correction",
        }
    }
}

/// External document a transaction can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceDocumentType {
    ProductionTicket,
    PurchasingTicket,
    SaleOrder,
}

impl ReferenceDocumentType {
    pub const ALL: &'static [ReferenceDocumentType] = &[
        ReferenceDocumentType::ProductionTicket,
        ReferenceDocumentType::PurchasingTicket,
        ReferenceDocumentType::SaleOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceDocumentType::ProductionTicket => "production_ticket",
            ReferenceDocumentType::PurchasingTicket => "purchasing_ticket",
            ReferenceDocumentType::SaleOrder => "sale_order",
        }
    }
}

/// A stock record: one ledger per (business, ledger kind, variant SKU).
///
/// Quantity fields travel as decimal strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: Uuid,
    pub business_id: Uuid,
    pub ledger_kind: String,
    pub variant_sku: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub current_stock: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub allocated_stock: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub future_stock: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub min_alert_stock: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_stock_level: Option<Decimal>,
    pub status: InventoryStatus,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_by_role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An append-only ledger entry owned by exactly one stock record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: i64,
    pub stock_record_id: Uuid,
    pub transaction_type: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub previous_stock: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub new_stock: Decimal,
    pub note: Option<String>,
    pub reference_document_type: Option<String>,
    pub reference_document_id: Option<Uuid>,
    pub transaction_source: String,
    pub created_by: Uuid,
    pub created_by_role: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a stock record.
#[derive(Debug, Deserialize)]
pub struct InitStockInput {
    pub variant_sku: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub current_stock: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_alert_stock: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_stock_level: Option<Decimal>,
    pub note: Option<String>,
}

/// Input for a single add/subtract/set transaction.
#[derive(Debug, Deserialize)]
pub struct StockTransactionInput {
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub note: Option<String>,
    pub reference_document_type: Option<ReferenceDocumentType>,
    pub reference_document_id: Option<Uuid>,
    pub transaction_source: Option<TransactionSource>,
}

/// Input for a threshold change (no ledger entry is written).
#[derive(Debug, Deserialize)]
pub struct ThresholdInput {
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
}

/// Input for a bulk add/subtract/set over many variant ids.
#[derive(Debug, Deserialize)]
pub struct BulkTransactionInput {
    pub variant_ids: Vec<Uuid>,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub note: Option<String>,
    pub reference_document_type: Option<ReferenceDocumentType>,
    pub reference_document_id: Option<Uuid>,
    pub transaction_source: Option<TransactionSource>,
}

/// Input for a bulk init keyed by SKU.
#[derive(Debug, Deserialize)]
pub struct BulkInitInput {
    pub variant_skus: Vec<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub current_stock: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_alert_stock: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_stock_level: Option<Decimal>,
}

//! Stock ledger service: one record per (ledger kind, variant SKU), mutated
//! only through add/subtract/set transactions, with bulk processing on top.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    BulkInitInput, BulkTransactionInput, InitStockInput, InventoryStatus, LedgerKind,
    ReferenceDocumentType, StockRecord, StockTransaction, StockTransactionInput, TransactionSource,
    TransactionType,
};
use shared::types::{Actor, BulkInitReport, BulkTransactionReport, TransactionEnums};
use shared::validation::{
    validate_quantity_non_negative, validate_quantity_positive, validate_sku,
    validate_threshold_bounds,
};

/// Inventory service owning the stock ledgers and their transaction history
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// How a locked stock row is addressed: by record id (API paths) or by SKU
/// (init and ticket fulfillment).
#[derive(Debug, Clone, Copy)]
pub(crate) enum StockKey<'a> {
    Id(Uuid),
    Sku(&'a str),
}

/// Metadata attached to a single ledger entry.
#[derive(Debug, Clone)]
pub(crate) struct TransactionMetadata {
    pub note: Option<String>,
    pub reference_document_type: Option<ReferenceDocumentType>,
    pub reference_document_id: Option<Uuid>,
    pub transaction_source: TransactionSource,
}

impl TransactionMetadata {
    fn from_input(input: &StockTransactionInput) -> Self {
        Self {
            note: input.note.clone(),
            reference_document_type: input.reference_document_type,
            reference_document_id: input.reference_document_id,
            transaction_source: input
                .transaction_source
                .unwrap_or(TransactionSource::ManualAdjustment),
        }
    }
}

/// Database row for a stock record. The stored status column is ignored on
/// read; the status is reclassified from the raw quantities.
#[derive(Debug, sqlx::FromRow)]
struct StockRecordRow {
    id: Uuid,
    business_id: Uuid,
    ledger_kind: String,
    variant_sku: String,
    current_stock: Decimal,
    allocated_stock: Decimal,
    future_stock: Decimal,
    min_alert_stock: Decimal,
    max_stock_level: Option<Decimal>,
    is_active: bool,
    created_by: Uuid,
    created_by_role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockRecordRow> for StockRecord {
    fn from(row: StockRecordRow) -> Self {
        let status = InventoryStatus::classify(
            row.current_stock,
            row.min_alert_stock,
            row.max_stock_level,
        );
        StockRecord {
            id: row.id,
            business_id: row.business_id,
            ledger_kind: row.ledger_kind,
            variant_sku: row.variant_sku,
            current_stock: row.current_stock,
            allocated_stock: row.allocated_stock,
            future_stock: row.future_stock,
            min_alert_stock: row.min_alert_stock,
            max_stock_level: row.max_stock_level,
            status,
            is_active: row.is_active,
            created_by: row.created_by,
            created_by_role: row.created_by_role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a ledger entry
#[derive(Debug, sqlx::FromRow)]
struct StockTransactionRow {
    id: i64,
    stock_record_id: Uuid,
    transaction_type: String,
    quantity: Decimal,
    previous_stock: Decimal,
    new_stock: Decimal,
    note: Option<String>,
    reference_document_type: Option<String>,
    reference_document_id: Option<Uuid>,
    transaction_source: String,
    created_by: Uuid,
    created_by_role: String,
    created_at: DateTime<Utc>,
}

impl From<StockTransactionRow> for StockTransaction {
    fn from(row: StockTransactionRow) -> Self {
        StockTransaction {
            id: row.id,
            stock_record_id: row.stock_record_id,
            transaction_type: row.transaction_type,
            quantity: row.quantity,
            previous_stock: row.previous_stock,
            new_stock: row.new_stock,
            note: row.note,
            reference_document_type: row.reference_document_type,
            reference_document_id: row.reference_document_id,
            transaction_source: row.transaction_source,
            created_by: row.created_by,
            created_by_role: row.created_by_role,
            created_at: row.created_at,
        }
    }
}

/// The quantities of a row-locked stock record
#[derive(Debug, sqlx::FromRow)]
struct LockedStock {
    id: Uuid,
    variant_sku: String,
    current_stock: Decimal,
    allocated_stock: Decimal,
    future_stock: Decimal,
    min_alert_stock: Decimal,
    max_stock_level: Option<Decimal>,
}

const RECORD_COLUMNS: &str = "id, business_id, ledger_kind, variant_sku, current_stock, \
     allocated_stock, future_stock, min_alert_stock, max_stock_level, is_active, \
     created_by, created_by_role, created_at, updated_at";

const TRANSACTION_COLUMNS: &str = "id, stock_record_id, transaction_type, quantity, \
     previous_stock, new_stock, note, reference_document_type, reference_document_id, \
     transaction_source, created_by, created_by_role, created_at";

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the stock record for a variant. Fails if one already exists.
    pub async fn init(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        input: InitStockInput,
        actor: &Actor,
    ) -> AppResult<StockRecord> {
        if let Err(msg) = validate_sku(&input.variant_sku) {
            return Err(AppError::Validation {
                field: "variant_sku".to_string(),
                message: msg.to_string(),
                message_th: "SKU ไม่ถูกต้อง".to_string(),
            });
        }
        let variant_sku = input.variant_sku.trim().to_string();

        if let Err(msg) = validate_quantity_non_negative(input.current_stock) {
            return Err(AppError::InvalidQuantity {
                message: msg.to_string(),
                message_th: "ปริมาณต้องไม่ติดลบ".to_string(),
            });
        }

        let min_alert = input.min_alert_stock.unwrap_or(Decimal::ZERO);
        if let Err(msg) = validate_threshold_bounds(min_alert, input.max_stock_level) {
            return Err(AppError::Validation {
                field: "min_alert_stock".to_string(),
                message: msg.to_string(),
                message_th: "เกณฑ์สต็อกไม่ถูกต้อง".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_records WHERE business_id = $1 AND ledger_kind = $2 AND variant_sku = $3)",
        )
        .bind(business_id)
        .bind(kind.as_str())
        .bind(&variant_sku)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Err(AppError::AlreadyExists {
                resource: format!("Stock record for SKU {}", variant_sku),
                message_th: format!("มีบัญชีสต็อกสำหรับ SKU {} อยู่แล้ว", variant_sku),
            });
        }

        let status =
            InventoryStatus::classify(input.current_stock, min_alert, input.max_stock_level);

        let row = sqlx::query_as::<_, StockRecordRow>(&format!(
            r#"
            INSERT INTO stock_records (
                business_id, ledger_kind, variant_sku, current_stock, allocated_stock,
                future_stock, min_alert_stock, max_stock_level, status, created_by, created_by_role
            )
            VALUES ($1, $2, $3, $4, 0, 0, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(business_id)
        .bind(kind.as_str())
        .bind(&variant_sku)
        .bind(input.current_stock)
        .bind(min_alert)
        .bind(input.max_stock_level)
        .bind(status.as_str())
        .bind(actor.user_id)
        .bind(&actor.role)
        .fetch_one(&mut *tx)
        .await?;

        // Opening stock enters the history as a SET entry so the ledger
        // reconciles from its first row.
        if input.current_stock > Decimal::ZERO {
            sqlx::query(
                r#"
                INSERT INTO stock_transactions (
                    stock_record_id, transaction_type, quantity, previous_stock, new_stock,
                    note, transaction_source, created_by, created_by_role
                )
                VALUES ($1, $2, $3, 0, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(row.id)
            .bind(TransactionType::Set.as_str())
            .bind(input.current_stock)
            .bind(&input.note)
            .bind(TransactionSource::InitialStock.as_str())
            .bind(actor.user_id)
            .bind(&actor.role)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            ledger = kind.as_str(),
            sku = %row.variant_sku,
            "stock record initialized"
        );

        Ok(row.into())
    }

    /// Add stock to a variant's ledger
    pub async fn add(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        variant_id: Uuid,
        input: StockTransactionInput,
        actor: &Actor,
    ) -> AppResult<StockTransaction> {
        if let Err(msg) = validate_quantity_positive(input.quantity) {
            return Err(AppError::InvalidQuantity {
                message: msg.to_string(),
                message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
            });
        }

        let meta = TransactionMetadata::from_input(&input);
        let mut tx = self.db.begin().await?;
        let transaction = self
            .apply_in_tx(
                &mut tx,
                business_id,
                kind,
                StockKey::Id(variant_id),
                TransactionType::In,
                input.quantity,
                &meta,
                actor,
            )
            .await?;
        tx.commit().await?;
        Ok(transaction)
    }

    /// Subtract stock from a variant's ledger. Fails rather than clamping
    /// when the ledger would go below zero.
    pub async fn subtract(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        variant_id: Uuid,
        input: StockTransactionInput,
        actor: &Actor,
    ) -> AppResult<StockTransaction> {
        if let Err(msg) = validate_quantity_positive(input.quantity) {
            return Err(AppError::InvalidQuantity {
                message: msg.to_string(),
                message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
            });
        }

        let meta = TransactionMetadata::from_input(&input);
        let mut tx = self.db.begin().await?;
        let transaction = self
            .apply_in_tx(
                &mut tx,
                business_id,
                kind,
                StockKey::Id(variant_id),
                TransactionType::Out,
                input.quantity,
                &meta,
                actor,
            )
            .await?;
        tx.commit().await?;
        Ok(transaction)
    }

    /// Set a variant's ledger to an absolute quantity. Writing the same
    /// quantity twice still appends two history rows.
    pub async fn set(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        variant_id: Uuid,
        input: StockTransactionInput,
        actor: &Actor,
    ) -> AppResult<StockTransaction> {
        if let Err(msg) = validate_quantity_non_negative(input.quantity) {
            return Err(AppError::InvalidQuantity {
                message: msg.to_string(),
                message_th: "ปริมาณต้องไม่ติดลบ".to_string(),
            });
        }

        let meta = TransactionMetadata::from_input(&input);
        let mut tx = self.db.begin().await?;
        let transaction = self
            .apply_in_tx(
                &mut tx,
                business_id,
                kind,
                StockKey::Id(variant_id),
                TransactionType::Set,
                input.quantity,
                &meta,
                actor,
            )
            .await?;
        tx.commit().await?;
        Ok(transaction)
    }

    /// Change the minimum alert threshold. Configuration change only: the
    /// status is recomputed but no ledger entry is written.
    pub async fn set_minimum_alert(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        variant_id: Uuid,
        value: Decimal,
    ) -> AppResult<StockRecord> {
        let mut tx = self.db.begin().await?;
        let record = Self::lock_record(&mut tx, business_id, kind, StockKey::Id(variant_id)).await?;

        if let Err(msg) = validate_threshold_bounds(value, record.max_stock_level) {
            return Err(AppError::Validation {
                field: "value".to_string(),
                message: msg.to_string(),
                message_th: "เกณฑ์สต็อกไม่ถูกต้อง".to_string(),
            });
        }

        let status = InventoryStatus::classify(record.current_stock, value, record.max_stock_level);
        let row = sqlx::query_as::<_, StockRecordRow>(&format!(
            "UPDATE stock_records SET min_alert_stock = $1, status = $2, updated_at = now() WHERE id = $3 RETURNING {}",
            RECORD_COLUMNS
        ))
        .bind(value)
        .bind(status.as_str())
        .bind(record.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Change the maximum stock level. Configuration change only.
    pub async fn set_maximum_level(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        variant_id: Uuid,
        value: Decimal,
    ) -> AppResult<StockRecord> {
        let mut tx = self.db.begin().await?;
        let record = Self::lock_record(&mut tx, business_id, kind, StockKey::Id(variant_id)).await?;

        if let Err(msg) = validate_threshold_bounds(record.min_alert_stock, Some(value)) {
            return Err(AppError::Validation {
                field: "value".to_string(),
                message: msg.to_string(),
                message_th: "เกณฑ์สต็อกไม่ถูกต้อง".to_string(),
            });
        }

        let status =
            InventoryStatus::classify(record.current_stock, record.min_alert_stock, Some(value));
        let row = sqlx::query_as::<_, StockRecordRow>(&format!(
            "UPDATE stock_records SET max_stock_level = $1, status = $2, updated_at = now() WHERE id = $3 RETURNING {}",
            RECORD_COLUMNS
        ))
        .bind(value)
        .bind(status.as_str())
        .bind(record.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Get a stock record by id
    pub async fn get_record(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        variant_id: Uuid,
    ) -> AppResult<StockRecord> {
        let row = sqlx::query_as::<_, StockRecordRow>(&format!(
            "SELECT {} FROM stock_records WHERE id = $1 AND business_id = $2 AND ledger_kind = $3",
            RECORD_COLUMNS
        ))
        .bind(variant_id)
        .bind(business_id)
        .bind(kind.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock record".to_string()))?;

        Ok(row.into())
    }

    /// Look up a stock record by SKU (used when resolving ticket line items)
    pub async fn find_by_sku(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        variant_sku: &str,
    ) -> AppResult<StockRecord> {
        let row = sqlx::query_as::<_, StockRecordRow>(&format!(
            "SELECT {} FROM stock_records WHERE business_id = $1 AND ledger_kind = $2 AND variant_sku = $3",
            RECORD_COLUMNS
        ))
        .bind(business_id)
        .bind(kind.as_str())
        .bind(variant_sku)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Stock record for SKU {}", variant_sku)))?;

        Ok(row.into())
    }

    /// List all stock records in a ledger
    pub async fn list_records(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
    ) -> AppResult<Vec<StockRecord>> {
        let rows = sqlx::query_as::<_, StockRecordRow>(&format!(
            "SELECT {} FROM stock_records WHERE business_id = $1 AND ledger_kind = $2 ORDER BY variant_sku",
            RECORD_COLUMNS
        ))
        .bind(business_id)
        .bind(kind.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Get the transaction history of a record, oldest first.
    pub async fn get_transactions(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        variant_id: Uuid,
    ) -> AppResult<Vec<StockTransaction>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stock_records WHERE id = $1 AND business_id = $2 AND ledger_kind = $3)",
        )
        .bind(variant_id)
        .bind(business_id)
        .bind(kind.as_str())
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Stock record".to_string()));
        }

        let rows = sqlx::query_as::<_, StockTransactionRow>(&format!(
            "SELECT {} FROM stock_transactions WHERE stock_record_id = $1 ORDER BY id",
            TRANSACTION_COLUMNS
        ))
        .bind(variant_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// The allowed transaction enumerations (configuration surface)
    pub fn transaction_enums(&self) -> TransactionEnums {
        TransactionEnums {
            reference_document_types: ReferenceDocumentType::ALL
                .iter()
                .map(|t| t.as_str())
                .collect(),
            transaction_sources: TransactionSource::ALL.iter().map(|s| s.as_str()).collect(),
        }
    }

    /// Apply one operation to many variant ids, isolating per-item failure.
    ///
    /// A failing id becomes an entry in the failed list; the rest of the
    /// batch still runs. Only a malformed request fails the whole call.
    pub async fn bulk_apply(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        op: TransactionType,
        input: BulkTransactionInput,
        actor: &Actor,
    ) -> AppResult<BulkTransactionReport> {
        if input.variant_ids.is_empty() {
            return Err(AppError::Validation {
                field: "variant_ids".to_string(),
                message: "At least one variant id is required".to_string(),
                message_th: "ต้องระบุรายการอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }

        let quantity_check = match op {
            TransactionType::Set => validate_quantity_non_negative(input.quantity),
            _ => validate_quantity_positive(input.quantity),
        };
        if let Err(msg) = quantity_check {
            return Err(AppError::InvalidQuantity {
                message: msg.to_string(),
                message_th: "ปริมาณไม่ถูกต้อง".to_string(),
            });
        }

        let mut report = BulkTransactionReport::new();
        for variant_id in &input.variant_ids {
            let item_input = StockTransactionInput {
                quantity: input.quantity,
                note: input.note.clone(),
                reference_document_type: input.reference_document_type,
                reference_document_id: input.reference_document_id,
                transaction_source: input.transaction_source,
            };
            let outcome = match op {
                TransactionType::In => {
                    self.add(business_id, kind, *variant_id, item_input, actor).await
                }
                TransactionType::Out => {
                    self.subtract(business_id, kind, *variant_id, item_input, actor)
                        .await
                }
                TransactionType::Set => {
                    self.set(business_id, kind, *variant_id, item_input, actor).await
                }
            };
            match outcome {
                Ok(transaction) => report.record_success(transaction),
                Err(e) => {
                    tracing::warn!(
                        variant_id = %variant_id,
                        code = e.code(),
                        "bulk {} skipped variant: {}",
                        op.as_str(),
                        e
                    );
                    report.record_failure(*variant_id, e.code(), e.to_string());
                }
            }
        }

        Ok(report)
    }

    /// Create many stock records in one call, keyed by SKU, isolating
    /// per-item failure. An already-initialized SKU is reported as a
    /// distinct ALREADY_EXISTS failure without aborting the batch.
    pub async fn bulk_init(
        &self,
        business_id: Uuid,
        kind: LedgerKind,
        input: BulkInitInput,
        actor: &Actor,
    ) -> AppResult<BulkInitReport> {
        if input.variant_skus.is_empty() {
            return Err(AppError::Validation {
                field: "variant_skus".to_string(),
                message: "At least one SKU is required".to_string(),
                message_th: "ต้องระบุ SKU อย่างน้อยหนึ่งรายการ".to_string(),
            });
        }

        let mut report = BulkInitReport::new();
        for variant_sku in &input.variant_skus {
            let item_input = InitStockInput {
                variant_sku: variant_sku.clone(),
                current_stock: input.current_stock,
                min_alert_stock: input.min_alert_stock,
                max_stock_level: input.max_stock_level,
                note: None,
            };
            match self.init(business_id, kind, item_input, actor).await {
                Ok(record) => report.record_success(record),
                Err(e) => {
                    tracing::warn!(sku = %variant_sku, code = e.code(), "bulk init skipped SKU: {}", e);
                    report.record_failure(variant_sku, e.code(), e.to_string());
                }
            }
        }

        Ok(report)
    }

    /// Apply one ledger operation inside an already-open transaction.
    ///
    /// Locks the record row, validates against the locked state, appends
    /// exactly one ledger entry and recomputes the denormalized status.
    pub(crate) async fn apply_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        kind: LedgerKind,
        key: StockKey<'_>,
        op: TransactionType,
        quantity: Decimal,
        meta: &TransactionMetadata,
        actor: &Actor,
    ) -> AppResult<StockTransaction> {
        let record = Self::lock_record(tx, business_id, kind, key).await?;

        let previous_stock = record.current_stock;
        let new_stock = match op {
            TransactionType::In => previous_stock + quantity,
            TransactionType::Out => {
                if quantity > previous_stock {
                    return Err(AppError::InsufficientStock {
                        message: format!(
                            "Insufficient stock for {}: requested {}, available {}",
                            record.variant_sku, quantity, previous_stock
                        ),
                        message_th: format!(
                            "สต็อกของ {} ไม่เพียงพอ: ต้องการ {} คงเหลือ {}",
                            record.variant_sku, quantity, previous_stock
                        ),
                    });
                }
                previous_stock - quantity
            }
            TransactionType::Set => quantity,
        };

        let row = sqlx::query_as::<_, StockTransactionRow>(&format!(
            r#"
            INSERT INTO stock_transactions (
                stock_record_id, transaction_type, quantity, previous_stock, new_stock,
                note, reference_document_type, reference_document_id, transaction_source,
                created_by, created_by_role
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(record.id)
        .bind(op.as_str())
        .bind(quantity)
        .bind(previous_stock)
        .bind(new_stock)
        .bind(&meta.note)
        .bind(meta.reference_document_type.map(|t| t.as_str()))
        .bind(meta.reference_document_id)
        .bind(meta.transaction_source.as_str())
        .bind(actor.user_id)
        .bind(&actor.role)
        .fetch_one(&mut **tx)
        .await?;

        let status = InventoryStatus::classify(
            new_stock,
            record.min_alert_stock,
            record.max_stock_level,
        );
        sqlx::query(
            "UPDATE stock_records SET current_stock = $1, status = $2, updated_at = now() WHERE id = $3",
        )
        .bind(new_stock)
        .bind(status.as_str())
        .bind(record.id)
        .execute(&mut **tx)
        .await?;

        Ok(row.into())
    }

    /// Reserve stock for a sale order line. No ledger entry: reservations
    /// move `allocated_stock` only.
    pub(crate) async fn allocate_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        kind: LedgerKind,
        variant_sku: &str,
        quantity: Decimal,
    ) -> AppResult<()> {
        let record = Self::lock_record(tx, business_id, kind, StockKey::Sku(variant_sku)).await?;

        let available = record.current_stock - record.allocated_stock;
        if quantity > available {
            return Err(AppError::InsufficientStock {
                message: format!(
                    "Insufficient stock for {}: requested {}, unallocated {}",
                    record.variant_sku, quantity, available
                ),
                message_th: format!(
                    "สต็อกของ {} ไม่เพียงพอ: ต้องการ {} คงเหลือที่ยังไม่จอง {}",
                    record.variant_sku, quantity, available
                ),
            });
        }

        sqlx::query(
            "UPDATE stock_records SET allocated_stock = allocated_stock + $1, updated_at = now() WHERE id = $2",
        )
        .bind(quantity)
        .bind(record.id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Release a sale-order reservation.
    pub(crate) async fn release_allocation_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        kind: LedgerKind,
        variant_sku: &str,
        quantity: Decimal,
    ) -> AppResult<()> {
        let record = Self::lock_record(tx, business_id, kind, StockKey::Sku(variant_sku)).await?;

        if quantity > record.allocated_stock {
            return Err(AppError::Internal(format!(
                "allocated stock below zero for {}",
                record.variant_sku
            )));
        }

        sqlx::query(
            "UPDATE stock_records SET allocated_stock = allocated_stock - $1, updated_at = now() WHERE id = $2",
        )
        .bind(quantity)
        .bind(record.id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Move a record's incoming (future) stock by a signed delta.
    pub(crate) async fn adjust_future_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        kind: LedgerKind,
        variant_sku: &str,
        delta: Decimal,
    ) -> AppResult<()> {
        let record = Self::lock_record(tx, business_id, kind, StockKey::Sku(variant_sku)).await?;

        let new_future = record.future_stock + delta;
        if new_future < Decimal::ZERO {
            return Err(AppError::Internal(format!(
                "future stock below zero for {}",
                record.variant_sku
            )));
        }

        sqlx::query(
            "UPDATE stock_records SET future_stock = $1, updated_at = now() WHERE id = $2",
        )
        .bind(new_future)
        .bind(record.id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Row-lock a stock record for the duration of one ledger operation.
    async fn lock_record(
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        kind: LedgerKind,
        key: StockKey<'_>,
    ) -> AppResult<LockedStock> {
        let row = match key {
            StockKey::Id(id) => {
                sqlx::query_as::<_, LockedStock>(
                    r#"
                    SELECT id, variant_sku, current_stock, allocated_stock, future_stock,
                           min_alert_stock, max_stock_level
                    FROM stock_records
                    WHERE business_id = $1 AND ledger_kind = $2 AND id = $3
                    FOR UPDATE
                    "#,
                )
                .bind(business_id)
                .bind(kind.as_str())
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
            }
            StockKey::Sku(sku) => {
                sqlx::query_as::<_, LockedStock>(
                    r#"
                    SELECT id, variant_sku, current_stock, allocated_stock, future_stock,
                           min_alert_stock, max_stock_level
                    FROM stock_records
                    WHERE business_id = $1 AND ledger_kind = $2 AND variant_sku = $3
                    FOR UPDATE
                    "#,
                )
                .bind(business_id)
                .bind(kind.as_str())
                .bind(sku)
                .fetch_optional(&mut **tx)
                .await?
            }
        };

        row.ok_or_else(|| AppError::NotFound("Stock record".to_string()))
    }
}

//! HTTP handlers for inventory ledger endpoints
//!
//! Mounted twice, once per ledger kind; the kind arrives as a router
//! extension.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::InventoryService;
use crate::AppState;
use crate::models::{
    BulkInitInput, BulkTransactionInput, InitStockInput, LedgerKind, StockRecord,
    StockTransaction, StockTransactionInput, ThresholdInput, TransactionType,
};
use shared::types::{BulkInitReport, BulkTransactionReport, TransactionEnums};

/// Create the stock record for a variant
pub async fn init_stock_record(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Json(input): Json<InitStockInput>,
) -> AppResult<Json<StockRecord>> {
    let service = InventoryService::new(state.db);
    let record = service
        .init(
            current_user.0.business_id,
            kind,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(record))
}

/// Create many stock records keyed by SKU, with per-item isolation
pub async fn bulk_init_stock(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Json(input): Json<BulkInitInput>,
) -> AppResult<Json<BulkInitReport>> {
    let service = InventoryService::new(state.db);
    let report = service
        .bulk_init(
            current_user.0.business_id,
            kind,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(report))
}

/// Add stock to a variant's ledger
pub async fn add_stock(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Path(variant_id): Path<Uuid>,
    Json(input): Json<StockTransactionInput>,
) -> AppResult<Json<StockTransaction>> {
    let service = InventoryService::new(state.db);
    let transaction = service
        .add(
            current_user.0.business_id,
            kind,
            variant_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(transaction))
}

/// Subtract stock from a variant's ledger
pub async fn subtract_stock(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Path(variant_id): Path<Uuid>,
    Json(input): Json<StockTransactionInput>,
) -> AppResult<Json<StockTransaction>> {
    let service = InventoryService::new(state.db);
    let transaction = service
        .subtract(
            current_user.0.business_id,
            kind,
            variant_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(transaction))
}

/// Set a variant's ledger to an absolute quantity
pub async fn set_stock(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Path(variant_id): Path<Uuid>,
    Json(input): Json<StockTransactionInput>,
) -> AppResult<Json<StockTransaction>> {
    let service = InventoryService::new(state.db);
    let transaction = service
        .set(
            current_user.0.business_id,
            kind,
            variant_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(transaction))
}

/// Bulk add over many variant ids
pub async fn bulk_add_stock(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Json(input): Json<BulkTransactionInput>,
) -> AppResult<Json<BulkTransactionReport>> {
    let service = InventoryService::new(state.db);
    let report = service
        .bulk_apply(
            current_user.0.business_id,
            kind,
            TransactionType::In,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(report))
}

/// Bulk subtract over many variant ids
pub async fn bulk_subtract_stock(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Json(input): Json<BulkTransactionInput>,
) -> AppResult<Json<BulkTransactionReport>> {
    let service = InventoryService::new(state.db);
    let report = service
        .bulk_apply(
            current_user.0.business_id,
            kind,
            TransactionType::Out,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(report))
}

/// Bulk set over many variant ids
pub async fn bulk_set_stock(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Json(input): Json<BulkTransactionInput>,
) -> AppResult<Json<BulkTransactionReport>> {
    let service = InventoryService::new(state.db);
    let report = service
        .bulk_apply(
            current_user.0.business_id,
            kind,
            TransactionType::Set,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(report))
}

/// Change a record's minimum alert threshold
pub async fn set_minimum_alert(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Path(variant_id): Path<Uuid>,
    Json(input): Json<ThresholdInput>,
) -> AppResult<Json<StockRecord>> {
    let service = InventoryService::new(state.db);
    let record = service
        .set_minimum_alert(current_user.0.business_id, kind, variant_id, input.value)
        .await?;
    Ok(Json(record))
}

/// Change a record's maximum stock level
pub async fn set_maximum_level(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Path(variant_id): Path<Uuid>,
    Json(input): Json<ThresholdInput>,
) -> AppResult<Json<StockRecord>> {
    let service = InventoryService::new(state.db);
    let record = service
        .set_maximum_level(current_user.0.business_id, kind, variant_id, input.value)
        .await?;
    Ok(Json(record))
}

/// List all stock records in the ledger
pub async fn list_stock_records(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockRecord>>> {
    let service = InventoryService::new(state.db);
    let records = service
        .list_records(current_user.0.business_id, kind)
        .await?;
    Ok(Json(records))
}

/// Get one stock record
pub async fn get_stock_record(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Path(variant_id): Path<Uuid>,
) -> AppResult<Json<StockRecord>> {
    let service = InventoryService::new(state.db);
    let record = service
        .get_record(current_user.0.business_id, kind, variant_id)
        .await?;
    Ok(Json(record))
}

/// Get a record's transaction history, oldest first
pub async fn get_stock_transactions(
    State(state): State<AppState>,
    Extension(kind): Extension<LedgerKind>,
    current_user: CurrentUser,
    Path(variant_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let service = InventoryService::new(state.db);
    let transactions = service
        .get_transactions(current_user.0.business_id, kind, variant_id)
        .await?;
    Ok(Json(transactions))
}

/// The allowed transaction enumerations
pub async fn get_transaction_enums(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<TransactionEnums>> {
    let service = InventoryService::new(state.db);
    Ok(Json(service.transaction_enums()))
}

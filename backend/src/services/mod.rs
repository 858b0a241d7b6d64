//! Business logic services for the Warehouse Back-Office Platform

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{LedgerKind, TicketLineItemInput};
use shared::validation::{validate_expected_date, validate_quantity_positive, validate_sku};

pub mod inventory;
pub mod production;
pub mod purchasing;
pub mod sales;

pub use inventory::InventoryService;
pub use production::ProductionTicketService;
pub use purchasing::PurchasingTicketService;
pub use sales::SaleOrderService;

/// Validate one requested ticket line item and resolve its SKU against the
/// given ledger. Shared by the three ticket families.
pub(crate) async fn resolve_line_item(
    business_id: Uuid,
    inventory: &InventoryService,
    kind: LedgerKind,
    item: &TicketLineItemInput,
    today: NaiveDate,
) -> AppResult<()> {
    if let Err(msg) = validate_sku(&item.variant_sku) {
        return Err(AppError::Validation {
            field: "variant_sku".to_string(),
            message: msg.to_string(),
            message_th: "SKU ไม่ถูกต้อง".to_string(),
        });
    }
    if let Err(msg) = validate_quantity_positive(item.quantity) {
        return Err(AppError::InvalidQuantity {
            message: msg.to_string(),
            message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
        });
    }
    if let Err(msg) = validate_expected_date(item.expected_date, today) {
        return Err(AppError::InvalidDate {
            message: msg.to_string(),
            message_th: "วันที่คาดหมายต้องไม่อยู่ในอดีต".to_string(),
        });
    }
    inventory
        .find_by_sku(business_id, kind, item.variant_sku.trim())
        .await?;
    Ok(())
}

//! Purchasing ticket service: bulk creation, detail status transitions and
//! the cascaded ticket status. Ordered material counts as future stock from
//! creation until it is received (READY) or the detail is cancelled.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::inventory::{InventoryService, StockKey, TransactionMetadata};
use crate::services::resolve_line_item;
use shared::models::{
    derive_parent_status, BulkCreateTicketInput, CancelInput, DetailStatus, LedgerKind,
    PurchasingDetailStatus, ReferenceDocumentType, StatusLogEntry, Ticket, TicketDetail,
    TicketStatus, TicketWithDetails, TransactionSource, TransactionType, TransitionDetailInput,
};
use shared::types::{Actor, BulkCreateReport};
use shared::validation::validate_ticket_name;

/// Purchasing ticket service
#[derive(Clone)]
pub struct PurchasingTicketService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    business_id: Uuid,
    name: String,
    status: String,
    is_active: bool,
    created_by: Uuid,
    created_by_role: String,
    updated_by: Option<Uuid>,
    updated_by_role: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Ticket {
            id: row.id,
            business_id: row.business_id,
            name: row.name,
            status: row.status,
            is_active: row.is_active,
            created_by: row.created_by,
            created_by_role: row.created_by_role,
            updated_by: row.updated_by,
            updated_by_role: row.updated_by_role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    id: Uuid,
    ticket_id: Uuid,
    variant_sku: String,
    quantity: Decimal,
    status: String,
    expected_date: NaiveDate,
    completed_date: Option<DateTime<Utc>>,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DetailRow> for TicketDetail {
    fn from(row: DetailRow) -> Self {
        TicketDetail {
            id: row.id,
            ticket_id: row.ticket_id,
            variant_sku: row.variant_sku,
            quantity: row.quantity,
            status: row.status,
            expected_date: row.expected_date,
            completed_date: row.completed_date,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusLogRow {
    id: i64,
    detail_id: Uuid,
    old_status: String,
    new_status: String,
    note: Option<String>,
    created_by: Uuid,
    created_by_role: String,
    created_at: DateTime<Utc>,
}

impl From<StatusLogRow> for StatusLogEntry {
    fn from(row: StatusLogRow) -> Self {
        StatusLogEntry {
            id: row.id,
            detail_id: row.detail_id,
            old_status: row.old_status,
            new_status: row.new_status,
            note: row.note,
            created_by: row.created_by,
            created_by_role: row.created_by_role,
            created_at: row.created_at,
        }
    }
}

const TICKET_COLUMNS: &str = "id, business_id, name, status, is_active, created_by, \
     created_by_role, updated_by, updated_by_role, created_at, updated_at";

const DETAIL_COLUMNS: &str = "id, ticket_id, variant_sku, quantity, status, expected_date, \
     completed_date, note, created_at, updated_at";

const LOG_COLUMNS: &str =
    "id, detail_id, old_status, new_status, note, created_by, created_by_role, created_at";

fn parse_detail_status(s: &str) -> AppResult<PurchasingDetailStatus> {
    PurchasingDetailStatus::parse(s)
        .ok_or_else(|| AppError::Internal(format!("corrupt purchasing detail status: {}", s)))
}

impl PurchasingTicketService {
    /// Create a new PurchasingTicketService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create one purchasing ticket with many line items in a single request.
    ///
    /// Every surviving line item registers its quantity as future stock on
    /// the material record inside the creation transaction.
    pub async fn bulk_create(
        &self,
        business_id: Uuid,
        input: BulkCreateTicketInput,
        actor: &Actor,
    ) -> AppResult<BulkCreateReport> {
        if let Err(msg) = validate_ticket_name(&input.name) {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: msg.to_string(),
                message_th: "ชื่อใบงานไม่ถูกต้อง".to_string(),
            });
        }
        if input.line_items.is_empty() {
            return Err(AppError::Validation {
                field: "line_items".to_string(),
                message: "At least one line item is required".to_string(),
                message_th: "ต้องระบุรายการอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }

        let name = input.name.trim().to_string();
        let inventory = InventoryService::new(self.db.clone());
        let today = Utc::now().date_naive();
        let total_requested = input.line_items.len();

        let mut errors = Vec::new();
        let mut accepted = Vec::new();
        for item in input.line_items {
            match resolve_line_item(business_id, &inventory, LedgerKind::Material, &item, today)
                .await
            {
                Ok(()) => accepted.push(item),
                Err(e) => errors.push(format!("{}: {}", item.variant_sku, e)),
            }
        }

        if accepted.is_empty() {
            return Ok(BulkCreateReport {
                created_tickets: Vec::new(),
                errors,
                total_requested,
                total_created: 0,
                total_failed: total_requested,
            });
        }

        let mut tx = self.db.begin().await?;

        let ticket_row = sqlx::query_as::<_, TicketRow>(&format!(
            r#"
            INSERT INTO purchasing_tickets (business_id, name, status, created_by, created_by_role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(business_id)
        .bind(&name)
        .bind(TicketStatus::New.as_str())
        .bind(actor.user_id)
        .bind(&actor.role)
        .fetch_one(&mut *tx)
        .await?;

        let mut details = Vec::new();
        for item in &accepted {
            let detail_row = sqlx::query_as::<_, DetailRow>(&format!(
                r#"
                INSERT INTO purchasing_ticket_details (ticket_id, variant_sku, quantity, status, expected_date, note)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {}
                "#,
                DETAIL_COLUMNS
            ))
            .bind(ticket_row.id)
            .bind(item.variant_sku.trim())
            .bind(item.quantity)
            .bind(PurchasingDetailStatus::INITIAL.as_str())
            .bind(item.expected_date)
            .bind(&item.note)
            .fetch_one(&mut *tx)
            .await?;

            // Ordered material is visible as incoming stock right away.
            inventory
                .adjust_future_in_tx(
                    &mut tx,
                    business_id,
                    LedgerKind::Material,
                    item.variant_sku.trim(),
                    item.quantity,
                )
                .await?;

            details.push(detail_row.into());
        }

        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket_row.id,
            created = accepted.len(),
            failed = errors.len(),
            "purchasing ticket created"
        );

        let total_created = accepted.len();
        Ok(BulkCreateReport {
            created_tickets: vec![TicketWithDetails {
                ticket: ticket_row.into(),
                details,
            }],
            errors,
            total_requested,
            total_created,
            total_failed: total_requested - total_created,
        })
    }

    /// List all purchasing tickets for a business
    pub async fn list_tickets(&self, business_id: Uuid) -> AppResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {} FROM purchasing_tickets WHERE business_id = $1 ORDER BY created_at DESC",
            TICKET_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Get a purchasing ticket with all of its details
    pub async fn get_ticket(
        &self,
        business_id: Uuid,
        ticket_id: Uuid,
    ) -> AppResult<TicketWithDetails> {
        let ticket_row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {} FROM purchasing_tickets WHERE id = $1 AND business_id = $2",
            TICKET_COLUMNS
        ))
        .bind(ticket_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchasing ticket".to_string()))?;

        let detail_rows = sqlx::query_as::<_, DetailRow>(&format!(
            "SELECT {} FROM purchasing_ticket_details WHERE ticket_id = $1 ORDER BY created_at",
            DETAIL_COLUMNS
        ))
        .bind(ticket_id)
        .fetch_all(&self.db)
        .await?;

        Ok(TicketWithDetails {
            ticket: ticket_row.into(),
            details: detail_rows.into_iter().map(|r| r.into()).collect(),
        })
    }

    /// Advance one detail's status with cascade.
    pub async fn transition_detail(
        &self,
        business_id: Uuid,
        ticket_id: Uuid,
        detail_id: Uuid,
        input: TransitionDetailInput,
        actor: &Actor,
    ) -> AppResult<TicketWithDetails> {
        let target = PurchasingDetailStatus::parse(&input.new_status).ok_or_else(|| {
            AppError::Validation {
                field: "new_status".to_string(),
                message: format!("Unknown status: {}", input.new_status),
                message_th: format!("สถานะไม่ถูกต้อง: {}", input.new_status),
            }
        })?;

        let mut tx = self.db.begin().await?;
        self.transition_in_tx(
            &mut tx,
            business_id,
            ticket_id,
            detail_id,
            target,
            input.note,
            actor,
        )
        .await?;
        tx.commit().await?;

        self.get_ticket(business_id, ticket_id).await
    }

    /// Cancel one detail. A reason is required.
    pub async fn cancel_detail(
        &self,
        business_id: Uuid,
        ticket_id: Uuid,
        detail_id: Uuid,
        input: CancelInput,
        actor: &Actor,
    ) -> AppResult<TicketWithDetails> {
        if input.reason.trim().is_empty() {
            return Err(AppError::Validation {
                field: "reason".to_string(),
                message: "A cancellation reason is required".to_string(),
                message_th: "ต้องระบุเหตุผลในการยกเลิก".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;
        self.transition_in_tx(
            &mut tx,
            business_id,
            ticket_id,
            detail_id,
            PurchasingDetailStatus::Cancelled,
            Some(input.reason),
            actor,
        )
        .await?;
        tx.commit().await?;

        self.get_ticket(business_id, ticket_id).await
    }

    /// Cancel a ticket: cancels every cancellable detail, then cascades once.
    pub async fn cancel_ticket(
        &self,
        business_id: Uuid,
        ticket_id: Uuid,
        input: CancelInput,
        actor: &Actor,
    ) -> AppResult<TicketWithDetails> {
        if input.reason.trim().is_empty() {
            return Err(AppError::Validation {
                field: "reason".to_string(),
                message: "A cancellation reason is required".to_string(),
                message_th: "ต้องระบุเหตุผลในการยกเลิก".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let ticket_row = Self::lock_ticket(&mut tx, business_id, ticket_id).await?;

        let detail_rows = sqlx::query_as::<_, DetailRow>(&format!(
            "SELECT {} FROM purchasing_ticket_details WHERE ticket_id = $1 ORDER BY created_at FOR UPDATE",
            DETAIL_COLUMNS
        ))
        .bind(ticket_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut cancelled_any = false;
        for detail in &detail_rows {
            let current = parse_detail_status(&detail.status)?;
            if !current.can_transition_to(PurchasingDetailStatus::Cancelled) {
                continue;
            }
            self.write_detail_transition(
                &mut tx,
                business_id,
                detail,
                current,
                PurchasingDetailStatus::Cancelled,
                Some(input.reason.clone()),
                actor,
            )
            .await?;
            cancelled_any = true;
        }

        if !cancelled_any {
            return Err(AppError::IllegalTransition {
                from: ticket_row.status,
                to: "cancelled".to_string(),
            });
        }

        self.cascade_in_tx(&mut tx, ticket_id, actor).await?;
        tx.commit().await?;

        self.get_ticket(business_id, ticket_id).await
    }

    /// Get the status-change log of one detail, oldest first.
    pub async fn get_status_logs(
        &self,
        business_id: Uuid,
        ticket_id: Uuid,
        detail_id: Uuid,
    ) -> AppResult<Vec<StatusLogEntry>> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM purchasing_ticket_details d
                JOIN purchasing_tickets t ON t.id = d.ticket_id
                WHERE d.id = $1 AND d.ticket_id = $2 AND t.business_id = $3
            )
            "#,
        )
        .bind(detail_id)
        .bind(ticket_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Ticket detail".to_string()));
        }

        let rows = sqlx::query_as::<_, StatusLogRow>(&format!(
            "SELECT {} FROM purchasing_detail_status_logs WHERE detail_id = $1 ORDER BY id",
            LOG_COLUMNS
        ))
        .bind(detail_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn transition_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        ticket_id: Uuid,
        detail_id: Uuid,
        target: PurchasingDetailStatus,
        note: Option<String>,
        actor: &Actor,
    ) -> AppResult<()> {
        Self::lock_ticket(tx, business_id, ticket_id).await?;

        let detail = sqlx::query_as::<_, DetailRow>(&format!(
            "SELECT {} FROM purchasing_ticket_details WHERE id = $1 AND ticket_id = $2 FOR UPDATE",
            DETAIL_COLUMNS
        ))
        .bind(detail_id)
        .bind(ticket_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket detail".to_string()))?;

        let current = parse_detail_status(&detail.status)?;
        if !current.can_transition_to(target) {
            return Err(AppError::IllegalTransition {
                from: current.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }

        self.write_detail_transition(tx, business_id, &detail, current, target, note, actor)
            .await?;
        self.cascade_in_tx(tx, ticket_id, actor).await?;

        Ok(())
    }

    async fn write_detail_transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        detail: &DetailRow,
        current: PurchasingDetailStatus,
        target: PurchasingDetailStatus,
        note: Option<String>,
        actor: &Actor,
    ) -> AppResult<()> {
        self.apply_stock_effects(tx, business_id, detail, target, actor)
            .await?;

        sqlx::query(
            r#"
            UPDATE purchasing_ticket_details
            SET status = $1,
                completed_date = CASE WHEN $2 THEN now() ELSE completed_date END,
                updated_at = now()
            WHERE id = $3
            "#,
        )
        .bind(target.as_str())
        .bind(target.is_terminal())
        .bind(detail.id)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO purchasing_detail_status_logs (detail_id, old_status, new_status, note, created_by, created_by_role)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(detail.id)
        .bind(current.as_str())
        .bind(target.as_str())
        .bind(&note)
        .bind(actor.user_id)
        .bind(&actor.role)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// READY converts future stock into an IN ledger entry; cancelling a
    /// detail that never arrived releases its future stock.
    async fn apply_stock_effects(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        detail: &DetailRow,
        target: PurchasingDetailStatus,
        actor: &Actor,
    ) -> AppResult<()> {
        let inventory = InventoryService::new(self.db.clone());
        match target {
            PurchasingDetailStatus::Ready => {
                inventory
                    .adjust_future_in_tx(
                        tx,
                        business_id,
                        LedgerKind::Material,
                        &detail.variant_sku,
                        -detail.quantity,
                    )
                    .await?;
                let meta = TransactionMetadata {
                    note: None,
                    reference_document_type: Some(ReferenceDocumentType::PurchasingTicket),
                    reference_document_id: Some(detail.ticket_id),
                    transaction_source: TransactionSource::TicketFulfillment,
                };
                inventory
                    .apply_in_tx(
                        tx,
                        business_id,
                        LedgerKind::Material,
                        StockKey::Sku(&detail.variant_sku),
                        TransactionType::In,
                        detail.quantity,
                        &meta,
                        actor,
                    )
                    .await?;
            }
            PurchasingDetailStatus::Cancelled => {
                inventory
                    .adjust_future_in_tx(
                        tx,
                        business_id,
                        LedgerKind::Material,
                        &detail.variant_sku,
                        -detail.quantity,
                    )
                    .await?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Recompute and persist the ticket status from its detail statuses.
    async fn cascade_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ticket_id: Uuid,
        actor: &Actor,
    ) -> AppResult<()> {
        let statuses: Vec<String> = sqlx::query_scalar(
            "SELECT status FROM purchasing_ticket_details WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .fetch_all(&mut **tx)
        .await?;

        let parsed = statuses
            .iter()
            .map(|s| parse_detail_status(s))
            .collect::<AppResult<Vec<_>>>()?;
        let parent = derive_parent_status(&parsed);

        sqlx::query(
            "UPDATE purchasing_tickets SET status = $1, updated_by = $2, updated_by_role = $3, updated_at = now() WHERE id = $4",
        )
        .bind(parent.as_str())
        .bind(actor.user_id)
        .bind(&actor.role)
        .bind(ticket_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn lock_ticket(
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        ticket_id: Uuid,
    ) -> AppResult<TicketRow> {
        sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {} FROM purchasing_tickets WHERE id = $1 AND business_id = $2 FOR UPDATE",
            TICKET_COLUMNS
        ))
        .bind(ticket_id)
        .bind(business_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchasing ticket".to_string()))
    }
}

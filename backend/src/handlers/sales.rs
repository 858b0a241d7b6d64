//! HTTP handlers for sale order endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::SaleOrderService;
use crate::AppState;
use crate::models::{
    BulkCreateTicketInput, CancelInput, StatusLogEntry, Ticket, TicketWithDetails,
    TransitionDetailInput,
};
use shared::types::BulkCreateReport;

/// Create one sale order with many lines
pub async fn bulk_create_sale_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<BulkCreateTicketInput>,
) -> AppResult<Json<BulkCreateReport>> {
    let service = SaleOrderService::new(state.db);
    let report = service
        .bulk_create(current_user.0.business_id, input, &current_user.0.actor())
        .await?;
    Ok(Json(report))
}

/// List sale orders
pub async fn list_sale_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Ticket>>> {
    let service = SaleOrderService::new(state.db);
    let orders = service.list_tickets(current_user.0.business_id).await?;
    Ok(Json(orders))
}

/// Get a sale order with its lines
pub async fn get_sale_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = SaleOrderService::new(state.db);
    let order = service
        .get_ticket(current_user.0.business_id, ticket_id)
        .await?;
    Ok(Json(order))
}

/// Advance one line's status; the order status cascades
pub async fn update_sale_order_detail_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<TransitionDetailInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = SaleOrderService::new(state.db);
    let order = service
        .transition_detail(
            current_user.0.business_id,
            ticket_id,
            detail_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(order))
}

/// Cancel a sale order (reason required)
pub async fn cancel_sale_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
    Json(input): Json<CancelInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = SaleOrderService::new(state.db);
    let order = service
        .cancel_ticket(
            current_user.0.business_id,
            ticket_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(order))
}

/// Cancel one line (reason required)
pub async fn cancel_sale_order_detail(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<CancelInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = SaleOrderService::new(state.db);
    let order = service
        .cancel_detail(
            current_user.0.business_id,
            ticket_id,
            detail_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(order))
}

/// Get one line's status-change log
pub async fn get_sale_order_detail_status_logs(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<StatusLogEntry>>> {
    let service = SaleOrderService::new(state.db);
    let logs = service
        .get_status_logs(current_user.0.business_id, ticket_id, detail_id)
        .await?;
    Ok(Json(logs))
}

//! HTTP handlers for purchasing ticket endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::PurchasingTicketService;
use crate::AppState;
use crate::models::{
    BulkCreateTicketInput, CancelInput, StatusLogEntry, Ticket, TicketWithDetails,
    TransitionDetailInput,
};
use shared::types::BulkCreateReport;

/// Create one purchasing ticket with many line items
pub async fn bulk_create_purchasing_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<BulkCreateTicketInput>,
) -> AppResult<Json<BulkCreateReport>> {
    let service = PurchasingTicketService::new(state.db);
    let report = service
        .bulk_create(current_user.0.business_id, input, &current_user.0.actor())
        .await?;
    Ok(Json(report))
}

/// List purchasing tickets
pub async fn list_purchasing_tickets(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Ticket>>> {
    let service = PurchasingTicketService::new(state.db);
    let tickets = service.list_tickets(current_user.0.business_id).await?;
    Ok(Json(tickets))
}

/// Get a purchasing ticket with its details
pub async fn get_purchasing_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = PurchasingTicketService::new(state.db);
    let ticket = service
        .get_ticket(current_user.0.business_id, ticket_id)
        .await?;
    Ok(Json(ticket))
}

/// Advance one detail's status; the ticket status cascades
pub async fn update_purchasing_detail_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<TransitionDetailInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = PurchasingTicketService::new(state.db);
    let ticket = service
        .transition_detail(
            current_user.0.business_id,
            ticket_id,
            detail_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(ticket))
}

/// Cancel a purchasing ticket (reason required)
pub async fn cancel_purchasing_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
    Json(input): Json<CancelInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = PurchasingTicketService::new(state.db);
    let ticket = service
        .cancel_ticket(
            current_user.0.business_id,
            ticket_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(ticket))
}

/// Cancel one detail (reason required)
pub async fn cancel_purchasing_detail(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<CancelInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = PurchasingTicketService::new(state.db);
    let ticket = service
        .cancel_detail(
            current_user.0.business_id,
            ticket_id,
            detail_id,
            input,
            &current_user.0.actor(),
        )
        .await?;
    Ok(Json(ticket))
}

/// Get one detail's status-change log
pub async fn get_purchasing_detail_status_logs(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<StatusLogEntry>>> {
    let service = PurchasingTicketService::new(state.db);
    let logs = service
        .get_status_logs(current_user.0.business_id, ticket_id, detail_id)
        .await?;
    Ok(Json(logs))
}

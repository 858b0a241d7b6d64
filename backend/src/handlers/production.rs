//! HTTP handlers for production ticket endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ProductionTicketService;
use crate::AppState;
use crate::models::{
    BulkCreateTicketInput, CancelInput, StatusLogEntry, Ticket, TicketWithDetails,
    TransitionDetailInput,
};
use shared::types::BulkCreateReport;

/// Create one production ticket with many line items
pub async fn bulk_create_production_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<BulkCreateTicketInput>,
) -> AppResult<Json<BulkCreateReport>> {
    let service = ProductionTicketService::new(state.db);
    let report = service
        .bulk_create(current_user.0.business_id, input, &current_user.0.actor())
        .await?;
    Ok(Json(report))
}

/// List production tickets
pub async fn list_production_tickets(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Ticket>>> {
    let service = ProductionTicketService::new(state.db);
    let tickets = service.list_tickets(current_user.0.business_id).await?;
    Ok(Json(tickets))
}

/// Get a production ticket with its details
pub async fn get_production_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = ProductionTicketService::new(state.db);
    let ticket = service
        .get_ticket(current_user.0.business_id, ticket_id)
        .await?;
    Ok(Json(ticket))
}

/// Advance one detail's status; the ticket status cascades
pub async fn update_production_detail_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<TransitionDetailInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = ProductionTicketService::new(state.db);
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

/// Cancel a production ticket (reason required)
pub async fn cancel_production_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
    Json(input): Json<CancelInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = ProductionTicketService::new(state.db);
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
pub async fn cancel_production_detail(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<CancelInput>,
) -> AppResult<Json<TicketWithDetails>> {
    let service = ProductionTicketService::new(state.db);
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
pub async fn get_production_detail_status_logs(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((ticket_id, detail_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<StatusLogEntry>>> {
    let service = ProductionTicketService::new(state.db);
    let logs = service
        .get_status_logs(current_user.0.business_id, ticket_id, detail_id)
        .await?;
    Ok(Json(logs))
}

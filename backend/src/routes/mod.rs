//! Route definitions for the Warehouse Back-Office Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Extension, Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};
use shared::models::LedgerKind;

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - product stock ledger
        .nest("/product-inventory", inventory_routes(LedgerKind::Product))
        // Protected routes - material stock ledger
        .nest("/material-inventory", inventory_routes(LedgerKind::Material))
        // Protected routes - production tickets
        .nest("/production-tickets", production_ticket_routes())
        // Protected routes - purchasing tickets
        .nest("/purchasing-tickets", purchasing_ticket_routes())
        // Protected routes - sale orders
        .nest("/sale-orders", sale_order_routes())
}

/// Stock ledger routes (protected), mounted once per ledger kind
fn inventory_routes(kind: LedgerKind) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock_records))
        .route("/init", post(handlers::init_stock_record))
        .route("/enums/transaction-enums", get(handlers::get_transaction_enums))
        // Bulk operations
        .route("/bulk/init", post(handlers::bulk_init_stock))
        .route("/bulk/add", put(handlers::bulk_add_stock))
        .route("/bulk/subtract", put(handlers::bulk_subtract_stock))
        .route("/bulk/set", put(handlers::bulk_set_stock))
        // Single-record operations
        .route("/:variant_id", get(handlers::get_stock_record))
        .route("/:variant_id/transactions", get(handlers::get_stock_transactions))
        .route("/:variant_id/add", put(handlers::add_stock))
        .route("/:variant_id/subtract", put(handlers::subtract_stock))
        .route("/:variant_id/set", put(handlers::set_stock))
        .route("/:variant_id/set-minimum", put(handlers::set_minimum_alert))
        .route("/:variant_id/set-maximum", put(handlers::set_maximum_level))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(kind))
}

/// Production ticket routes (protected)
fn production_ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_production_tickets))
        .route("/bulk-create", post(handlers::bulk_create_production_ticket))
        .route("/:ticket_id", get(handlers::get_production_ticket))
        .route("/:ticket_id/cancel", put(handlers::cancel_production_ticket))
        .route(
            "/:ticket_id/details/:detail_id/status",
            put(handlers::update_production_detail_status),
        )
        .route(
            "/:ticket_id/details/:detail_id/cancel",
            put(handlers::cancel_production_detail),
        )
        .route(
            "/:ticket_id/details/:detail_id/status-logs",
            get(handlers::get_production_detail_status_logs),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchasing ticket routes (protected)
fn purchasing_ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_purchasing_tickets))
        .route("/bulk-create", post(handlers::bulk_create_purchasing_ticket))
        .route("/:ticket_id", get(handlers::get_purchasing_ticket))
        .route("/:ticket_id/cancel", put(handlers::cancel_purchasing_ticket))
        .route(
            "/:ticket_id/details/:detail_id/status",
            put(handlers::update_purchasing_detail_status),
        )
        .route(
            "/:ticket_id/details/:detail_id/cancel",
            put(handlers::cancel_purchasing_detail),
        )
        .route(
            "/:ticket_id/details/:detail_id/status-logs",
            get(handlers::get_purchasing_detail_status_logs),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale order routes (protected)
fn sale_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sale_orders))
        .route("/bulk-create", post(handlers::bulk_create_sale_order))
        .route("/:ticket_id", get(handlers::get_sale_order))
        .route("/:ticket_id/cancel", put(handlers::cancel_sale_order))
        .route(
            "/:ticket_id/details/:detail_id/status",
            put(handlers::update_sale_order_detail_status),
        )
        .route(
            "/:ticket_id/details/:detail_id/cancel",
            put(handlers::cancel_sale_order_detail),
        )
        .route(
            "/:ticket_id/details/:detail_id/status-logs",
            get(handlers::get_sale_order_detail_status_logs),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

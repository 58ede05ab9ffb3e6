//! Fault API Module
//!
//! The main surface of the backend: list/create/update, lifecycle
//! transitions, transfer, audit history, notes, reporting and exports.

mod export;
mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/faults", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/general", post(handler::create_general))
        .route("/metrics", get(handler::metrics))
        .route("/charts", get(handler::charts))
        .route("/department/dashboard", get(handler::department_dashboard))
        .route("/department/metrics", get(handler::department_metrics))
        .route("/department/charts", get(handler::department_charts))
        .route("/export", get(export::export_xlsx))
        .route("/export/pdf", post(export::export_pdf))
        .route("/{id}", put(handler::update))
        .route("/{id}/details", get(handler::details))
        .route("/{id}/history", get(handler::history))
        .route("/{id}/notes", post(handler::create_note))
        .route("/{id}/transfer", post(handler::transfer));

    // Hard delete is admin-only
    let manage_routes = Router::new()
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}

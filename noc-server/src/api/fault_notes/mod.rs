//! Fault Note API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/fault-notes/{fault_id}", get(handler::list_for_fault))
}

//! REST API modules, one per resource.
//!
//! Each module exposes a `router()` merged into the app by
//! `core::server::build_app`.

pub mod auth;
pub mod customers;
pub mod departments;
pub mod fault_notes;
pub mod faults;
pub mod health;
pub mod users;

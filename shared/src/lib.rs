//! Shared data models for the NOC fault-ticket backend.
//!
//! Holds the entity structs and request payloads used by both the server
//! crate and any future client tooling, plus small time utilities.

pub mod models;
pub mod util;

//! Annotations mapper service library.
//!
//! Exposes config, state, error handling, health and routes so both the
//! binary entrypoint and integration tests build the same application.

pub mod config;
pub mod error;
pub mod health;
pub mod router;
pub mod routes;
pub mod state;

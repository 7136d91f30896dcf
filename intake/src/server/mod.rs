//! HTTP server module.
//!
//! This module provides the Axum-based HTTP shell around the registration
//! workflow:
//! - Application state and per-request stores
//! - Page handlers for the three workflow steps
//! - Health check endpoints
//! - Router configuration with the session layer

pub mod handlers;
pub mod health;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;

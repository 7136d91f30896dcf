//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints.

use super::handlers::{index, select_problem, submit_details};
use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::config::SessionConfig;
use crate::session::SessionSettings;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Routes:
/// - `GET /`: option list
/// - `POST /form2`: option selection
/// - `POST /submit`: details submission
/// - `GET /health`, `GET /health/ready`: liveness and readiness
///
/// Session data travels in a signed cookie; the server keeps none of it.
pub fn build_router(state: AppState, session: &SessionConfig) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/form2", post(select_problem))
        .route("/submit", post(submit_details))
        // Health checks
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .layer(Extension(SessionSettings::from_config(session)))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

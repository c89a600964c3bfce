//! Route definitions for the access gate.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// POST /login        -> login
/// POST /logout       -> logout
/// GET  /auth/status  -> status
/// POST /shutdown     -> shutdown (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/auth/status", get(auth::status))
        .route("/shutdown", post(auth::shutdown))
}

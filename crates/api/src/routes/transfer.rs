//! Route definitions for export and import.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::transfer;
use crate::state::AppState;

/// Import documents are whole-dataset exports; allow more than axum's 2 MiB
/// default.
const IMPORT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// ```text
/// GET  /export  -> export
/// POST /import  -> import
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(transfer::export))
        .route(
            "/import",
            post(transfer::import).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
}

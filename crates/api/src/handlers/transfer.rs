//! Handlers for whole-dataset export and import.

use axum::extract::State;
use axum::Json;
use serde_json::Value;
use socialmap_core::transfer::{ExportDocument, ImportRequest, ImportSummary};
use socialmap_db::export::export_snapshot;
use socialmap_db::import::run_import;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::access::{ReadAccess, RequireAuth};
use crate::state::AppState;

/// GET /export
///
/// Versioned snapshot of every idea and scheduled post.
pub async fn export(
    _access: ReadAccess,
    State(state): State<AppState>,
) -> AppResult<Json<ExportDocument>> {
    let document = export_snapshot(&state.pool).await?;

    tracing::info!(
        ideas = document.ideas.len(),
        scheduled_posts = document.scheduled_posts.len(),
        "Export generated",
    );

    Ok(Json(document))
}

/// POST /import
///
/// Reconcile an export-shaped document into the store in one transaction.
/// Bad records are skipped and counted; any other failure rolls the whole
/// import back.
pub async fn import(
    RequireAuth(_session): RequireAuth,
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<ImportSummary>> {
    let request = ImportRequest::parse(body)?;
    let summary = run_import(&state.pool, request).await?;
    Ok(Json(summary))
}

//! Handlers for the `/themes` resource.

use axum::extract::State;
use axum::Json;
use socialmap_db::models::theme::ThemeUsage;
use socialmap_db::repositories::ThemeRepo;

use crate::error::AppResult;
use crate::middleware::access::ReadAccess;
use crate::state::AppState;

/// GET /themes
///
/// All themes ordered by name, with how many ideas use each.
pub async fn list_themes(
    _access: ReadAccess,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ThemeUsage>>> {
    let themes = ThemeRepo::list_with_usage(&state.pool).await?;
    Ok(Json(themes))
}

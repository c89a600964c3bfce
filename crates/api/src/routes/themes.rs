use axum::routing::get;
use axum::Router;

use crate::handlers::themes;
use crate::state::AppState;

/// ```text
/// GET /themes -> list_themes
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/themes", get(themes::list_themes))
}

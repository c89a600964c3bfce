//! Route definitions for the `/ideas` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::ideas;
use crate::state::AppState;

/// ```text
/// GET    /ideas        -> list_ideas
/// POST   /ideas        -> create_idea
/// DELETE /ideas?id=    -> delete_idea
/// PUT    /ideas/{id}   -> update_idea
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/ideas",
            get(ideas::list_ideas)
                .post(ideas::create_idea)
                .delete(ideas::delete_idea),
        )
        .route("/ideas/{id}", put(ideas::update_idea))
}

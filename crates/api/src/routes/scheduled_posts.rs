//! Route definitions for the `/scheduled-posts` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::scheduled_posts;
use crate::state::AppState;

/// ```text
/// GET    /scheduled-posts        -> list_scheduled_posts
/// POST   /scheduled-posts        -> create_scheduled_post
/// PUT    /scheduled-posts/{id}   -> update_scheduled_post
/// DELETE /scheduled-posts/{id}   -> delete_scheduled_post
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/scheduled-posts",
            get(scheduled_posts::list_scheduled_posts)
                .post(scheduled_posts::create_scheduled_post),
        )
        .route(
            "/scheduled-posts/{id}",
            put(scheduled_posts::update_scheduled_post)
                .delete(scheduled_posts::delete_scheduled_post),
        )
}

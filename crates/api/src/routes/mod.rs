pub mod auth;
pub mod health;
pub mod ideas;
pub mod scheduled_posts;
pub mod themes;
pub mod transfer;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree, mounted at the root.
///
/// Route hierarchy:
///
/// ```text
/// /login                        start a session (public)
/// /logout                       clear the session cookie (public)
/// /auth/status                  session check
/// /shutdown                     stop the server (auth)
///
/// /ideas                        list (read), create (auth), delete ?id= (auth)
/// /ideas/{id}                   update (auth)
/// /themes                       list with usage counts (read)
///
/// /scheduled-posts              list (read), create (auth)
/// /scheduled-posts/{id}         update, delete (auth)
///
/// /export                       versioned snapshot (read)
/// /import                       reconcile a document (auth)
/// ```
///
/// "read" routes need a session unless public reads are enabled.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(ideas::router())
        .merge(themes::router())
        .merge(scheduled_posts::router())
        .merge(transfer::router())
}

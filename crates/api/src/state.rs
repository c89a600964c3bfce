use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and the token are handles, the config is behind
/// an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: socialmap_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Cancelled to stop the server; `POST /shutdown` triggers it.
    pub shutdown: CancellationToken,
}

//! Gate extractors used in handler signatures.
//!
//! Each wraps [`Session`] so a route's access rule is visible in its
//! handler's type.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a valid session. Rejects with 401 otherwise.
pub struct RequireAuth(pub Session);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(RequireAuth(session))
    }
}

/// Gate for read-only endpoints.
///
/// Requires a valid session unless `PUBLIC_READS` is enabled, in which case
/// the request passes with no session attached.
pub struct ReadAccess(pub Option<Session>);

impl FromRequestParts<AppState> for ReadAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.public_reads {
            return Ok(ReadAccess(None));
        }
        let session = Session::from_request_parts(parts, state).await?;
        Ok(ReadAccess(Some(session)))
    }
}

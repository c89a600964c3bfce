//! Session extraction for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use chrono::DateTime;
use socialmap_core::error::CoreError;
use socialmap_core::types::Timestamp;

use crate::auth::cookie::SESSION_COOKIE_NAME;
use crate::auth::jwt::validate_token;
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::state::AppState;

/// A validated session.
///
/// ```ignore
/// async fn my_handler(session: Session) -> AppResult<Json<()>> {
///     tracing::info!(role = %session.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    pub role: String,
    pub expires_at: Timestamp,
}

fn unauthorized() -> AppError {
    AppError::Core(CoreError::Unauthorized("Unauthorized".into()))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn session_from_token(token: &str, config: &AuthConfig) -> Option<Session> {
    let claims = validate_token(token, config).ok()?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0)?;
    Some(Session {
        role: claims.role,
        expires_at,
    })
}

/// Validate the session carried by `headers`.
///
/// The `sm_session` cookie is tried first. `Authorization: Bearer <token>`
/// is accepted for scripted clients, including when a stale cookie is also
/// sent.
pub fn authenticate(headers: &HeaderMap, config: &AuthConfig) -> Result<Session, AppError> {
    [cookie_token(headers), bearer_token(headers)]
        .into_iter()
        .flatten()
        .find_map(|token| session_from_token(&token, config))
        .ok_or_else(unauthorized)
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, &state.config.auth)
    }
}

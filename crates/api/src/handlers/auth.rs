//! Handlers for the access gate (login, logout, status, shutdown).

use std::time::Duration;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use socialmap_core::error::CoreError;
use socialmap_core::types::Timestamp;

use crate::auth::cookie::{build_clear_cookie, build_session_cookie};
use crate::auth::jwt::generate_session_token;
use crate::auth::password::{password_matches, MAX_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::access::RequireAuth;
use crate::middleware::auth::authenticate;
use crate::state::AppState;

/// Delay between answering `POST /shutdown` and stopping the server, so the
/// response is flushed first.
const SHUTDOWN_DELAY: Duration = Duration::from_millis(150);

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Successful login. The token is also set as the `sm_session` cookie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    pub expires_at: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub ok: bool,
    pub role: String,
    pub expires_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct Acknowledgement {
    pub ok: bool,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /login
///
/// Check the password and start a session.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Response> {
    if input.password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::BadRequest("Invalid password format".into()));
    }

    let auth = &state.config.auth;
    if !auth.has_password() {
        tracing::error!("Login attempted but no password is configured");
        let body = json!({
            "message": "Authentication is not configured on the server.",
            "code": "AUTH_NOT_CONFIGURED",
        });
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response());
    }

    if !password_matches(auth, &input.password) {
        tracing::warn!("Login rejected");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid credentials".into(),
        )));
    }

    let (token, claims) = generate_session_token(auth)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| AppError::InternalError("Token expiry out of range".into()))?;
    let cookie = build_session_cookie(&token, auth)?;

    tracing::info!(jti = %claims.jti, %expires_at, "Session started");

    let body = LoginResponse {
        ok: true,
        token,
        expires_at,
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /logout
///
/// Clear the session cookie. Tokens are stateless, so nothing is revoked
/// server-side.
pub async fn logout(State(state): State<AppState>) -> AppResult<Response> {
    let cookie = build_clear_cookie(&state.config.auth)?;
    let body = Acknowledgement {
        ok: true,
        message: "Logged out",
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// GET /auth/status
///
/// `{ ok: true, role, expiresAt }` for a valid session, 401 `{ ok: false }`
/// otherwise.
pub async fn status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authenticate(&headers, &state.config.auth) {
        Ok(session) => Json(SessionStatus {
            ok: true,
            role: session.role,
            expires_at: session.expires_at,
        })
        .into_response(),
        Err(_) => (StatusCode::UNAUTHORIZED, Json(json!({ "ok": false }))).into_response(),
    }
}

/// POST /shutdown
///
/// Acknowledge, then trigger the same graceful shutdown as SIGTERM.
pub async fn shutdown(
    RequireAuth(_session): RequireAuth,
    State(state): State<AppState>,
) -> Json<Acknowledgement> {
    tracing::info!("Shutdown requested over HTTP");

    let token = state.shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(SHUTDOWN_DELAY).await;
        token.cancel();
    });

    Json(Acknowledgement {
        ok: true,
        message: "Server stopping",
    })
}

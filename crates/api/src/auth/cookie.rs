//! Session cookie formatting.
//!
//! The cookie carries the signed session token. It is `HttpOnly` and
//! `SameSite=Lax`; `Secure` is added when configured.

use axum::http::HeaderValue;

use crate::config::AuthConfig;
use crate::error::AppError;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "sm_session";

/// Build the `Set-Cookie` value that stores a session token.
pub fn build_session_cookie(token: &str, config: &AuthConfig) -> Result<HeaderValue, AppError> {
    format_cookie(token, config.secure_cookie, config.session_ttl_secs())
}

/// Build the `Set-Cookie` value that clears the session cookie.
pub fn build_clear_cookie(config: &AuthConfig) -> Result<HeaderValue, AppError> {
    format_cookie("", config.secure_cookie, 0)
}

fn format_cookie(value: &str, secure: bool, max_age: i64) -> Result<HeaderValue, AppError> {
    let secure = if secure { " Secure;" } else { "" };
    let cookie = format!(
        "{SESSION_COOKIE_NAME}={value}; HttpOnly;{secure} SameSite=Lax; Path=/; Max-Age={max_age}"
    );
    cookie
        .parse()
        .map_err(|_| AppError::InternalError("Failed to build session cookie header".into()))
}

//! Session handling
//!
//! The session token travels in the `dfa_session` cookie. API routes behind
//! `require_session` answer 401 without one; pages redirect instead (see
//! `ui::serve_page`).

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use docfinder_common::identity::Session;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::AppError;
use crate::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "dfa_session";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session token from the request cookies, if any
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// Resolve the request's session through the identity service
pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Result<Option<Session>, AppError> {
    match session_token(headers) {
        Some(token) => Ok(state.identity.current_session(&token).await?),
        None => Ok(None),
    }
}

/// Middleware for API routes that need a signed-in user
///
/// Inserts the `Session` into request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = current_session(&state, request.headers())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

fn expired_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }

    let session = state
        .identity
        .sign_in(email, &request.password)
        .await
        .map_err(|e| match e {
            docfinder_common::Error::Unauthorized(_) => {
                warn!("Failed sign-in for {}", email);
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            other => AppError::from(other),
        })?;

    let cookie = session_cookie(&session.token, state.session_max_age_secs);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "email": session.user_email })),
    )
        .into_response())
}

/// POST /api/auth/logout
///
/// Always clears the cookie, even without a live session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        state.identity.sign_out(&token).await?;
    }
    Ok((
        [(header::SET_COOKIE, expired_cookie())],
        Json(json!({ "status": "signed_out" })),
    )
        .into_response())
}

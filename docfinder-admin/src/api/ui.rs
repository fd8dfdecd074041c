//! UI serving routes
//!
//! Every page path serves the same HTML shell; the script picks the view
//! from the location. Access rules are applied here, before the shell is
//! sent.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::warn;

use crate::api::auth::current_session;
use crate::routing::{route_access, RouteDecision};
use crate::AppState;

const INDEX_HTML: &str = include_str!("../../ui/index.html");
const APP_JS: &str = include_str!("../../ui/app.js");

/// Fallback for every path no other route claims
pub async fn serve_page(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let authenticated = match current_session(&state, &headers).await {
        Ok(session) => session.is_some(),
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            false
        }
    };

    match route_access(uri.path(), authenticated) {
        RouteDecision::Allow(_) => Html(INDEX_HTML).into_response(),
        RouteDecision::RedirectTo(target) => Redirect::to(target).into_response(),
    }
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

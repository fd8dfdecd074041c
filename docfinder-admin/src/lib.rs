//! docfinder-admin library - Doctor directory administration service
//!
//! Session-gated management of the doctor directory: list and search,
//! add/edit/delete, dashboard counts and reports. Persistence, identity and
//! photo storage are reached only through the collaborator traits in
//! `docfinder_common`.

use axum::Router;
use docfinder_common::blob::BlobStore;
use docfinder_common::identity::IdentityClient;
use docfinder_common::store::RecordStore;
use std::path::PathBuf;
use std::sync::Arc;

pub mod api;
pub mod bootstrap;
pub mod error;
pub mod flows;
pub mod forms;
pub mod roster;
pub mod routing;

#[cfg(test)]
pub(crate) mod testing;

use flows::DeleteConfirmations;
use roster::RosterSubscription;

/// URL prefix the blob folder is served under
pub const BLOB_URL_PREFIX: &str = "/blobs";

/// Largest accepted request body (photo uploads)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub identity: Arc<dyn IdentityClient>,
    pub blobs: Arc<dyn BlobStore>,
    /// Service-wide roster projection backing list, dashboard and reports
    pub roster: Arc<RosterSubscription>,
    pub deletions: Arc<DeleteConfirmations>,
    /// Folder served under `BLOB_URL_PREFIX`
    pub blob_dir: PathBuf,
    /// Lifetime of the session cookie
    pub session_max_age_secs: u64,
}

impl AppState {
    /// Create application state and start the roster projection
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityClient>,
        blobs: Arc<dyn BlobStore>,
        blob_dir: PathBuf,
        session_max_age_secs: u64,
    ) -> Self {
        let roster = Arc::new(RosterSubscription::subscribe(store.as_ref()));
        Self {
            store,
            identity,
            blobs,
            roster,
            deletions: Arc::new(DeleteConfirmations::new()),
            blob_dir,
            session_max_age_secs,
        }
    }
}

/// Build application router
///
/// API routes under `/api` need a session (401 otherwise). Pages are served
/// by the fallback, which applies the page access rules.
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    // Protected routes (require a session)
    let protected = Router::new()
        .route("/api/doctors", get(api::list_doctors).post(api::create_doctor))
        .route("/api/doctors/:id", get(api::get_doctor).post(api::update_doctor))
        .route("/api/doctors/:id/delete", post(api::request_delete))
        .route("/api/deletions/:token/confirm", post(api::confirm_delete))
        .route("/api/deletions/:token/cancel", post(api::cancel_delete))
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/reports", get(api::get_reports))
        .route("/api/specialties", get(api::list_specialties))
        .route("/api/events", get(api::event_stream))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Public routes
    let public = Router::new()
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/logout", post(api::logout))
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/static/app.js", get(api::serve_app_js))
        .nest_service(BLOB_URL_PREFIX, ServeDir::new(&state.blob_dir))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .fallback(api::serve_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

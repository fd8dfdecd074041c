//! HTTP API handlers for docfinder-admin

pub mod auth;
pub mod buildinfo;
pub mod deletions;
pub mod doctors;
pub mod health;
pub mod reports;
pub mod sse;
pub mod ui;

pub use auth::{login, logout, require_session, SESSION_COOKIE};
pub use buildinfo::get_build_info;
pub use deletions::{cancel_delete, confirm_delete};
pub use doctors::{create_doctor, get_doctor, list_doctors, request_delete, update_doctor};
pub use health::health_routes;
pub use reports::{get_dashboard, get_reports, list_specialties};
pub use sse::event_stream;
pub use ui::{serve_app_js, serve_page};

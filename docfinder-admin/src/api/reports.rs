//! Dashboard, reports and reference data

use axum::{extract::State, Json};
use docfinder_common::models::Specialty;
use serde::Serialize;

use crate::roster::{build_report, Report};
use crate::AppState;

/// Dashboard tiles
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub doctor_count: usize,
    pub specialty_count: usize,
}

/// GET /api/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    let view = state.roster.view();
    Json(Dashboard {
        doctor_count: view.doctor_count,
        specialty_count: view.specialty_count,
    })
}

/// GET /api/reports
pub async fn get_reports(State(state): State<AppState>) -> Json<Report> {
    Json(build_report(&state.roster.view().doctors))
}

/// GET /api/specialties
///
/// The full enumeration, in presentation order, for the form dropdown.
pub async fn list_specialties() -> Json<Vec<&'static str>> {
    Json(Specialty::ALL.iter().map(|s| s.name()).collect())
}

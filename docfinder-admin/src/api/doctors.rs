//! Doctor API
//!
//! Reads come from the live roster projection; writes go through the flows
//! straight to the record store.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use docfinder_common::models::{Doctor, DoctorPatch, Specialty};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::flows::{self, EditForm, PhotoUpload};
use crate::forms::{reduce, DoctorForm, FormField, FormValue};
use crate::roster::filter_doctors;
use crate::AppState;

/// Name of the multipart file part carrying the photo
const PHOTO_FIELD: &str = "photo";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Free-text search over name, email and address
    #[serde(default)]
    pub q: String,
    /// Exact specialty name
    #[serde(default)]
    pub specialty: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorListResponse {
    pub doctors: Vec<Doctor>,
    pub total: usize,
    /// Specialties present in the whole roster, for the filter dropdown
    pub specialties: Vec<Specialty>,
}

/// Confirmation prompt for a pending delete
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePrompt {
    pub token: Uuid,
    pub doctor_id: String,
    pub prompt: String,
}

/// GET /api/doctors?q=&specialty=
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<DoctorListResponse> {
    let view = state.roster.view();
    let doctors: Vec<Doctor> = filter_doctors(&view.doctors, &query.q, &query.specialty)
        .into_iter()
        .cloned()
        .collect();

    Json(DoctorListResponse {
        total: doctors.len(),
        doctors,
        specialties: view.specialties.clone(),
    })
}

/// POST /api/doctors (multipart)
pub async fn create_doctor(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    let (form, photo) = read_form(DoctorForm::default(), multipart).await?;
    let doctor = flows::add_doctor(state.store.as_ref(), state.blobs.as_ref(), &form, photo).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// GET /api/doctors/:id
///
/// The stored record as form values, for pre-populating the edit page.
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EditForm>, AppError> {
    Ok(Json(flows::load_for_edit(state.store.as_ref(), &id).await?))
}

/// POST /api/doctors/:id (multipart)
///
/// Posted fields are applied over the stored values, so a submission may
/// omit inputs it did not change.
pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<DoctorPatch>, AppError> {
    let current = flows::load_for_edit(state.store.as_ref(), &id).await?;
    let (form, photo) = read_form(current.form, multipart).await?;
    let patch = flows::submit_edit(state.store.as_ref(), state.blobs.as_ref(), &id, &form, photo).await?;
    Ok(Json(patch))
}

/// POST /api/doctors/:id/delete
///
/// Records a delete intent; nothing is removed until the token is confirmed.
pub async fn request_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletePrompt>, AppError> {
    let view = state.roster.view();
    let doctor = view
        .doctors
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let intent = state.deletions.request(doctor);
    Ok(Json(DeletePrompt {
        token: intent.token,
        prompt: intent.prompt(),
        doctor_id: intent.doctor_id,
    }))
}

/// Fold a multipart submission into `form`
///
/// Text parts named after form fields go through the reducer; the `photo`
/// part becomes an upload when it carries a file name and bytes.
async fn read_form(
    mut form: DoctorForm,
    mut multipart: Multipart,
) -> Result<(DoctorForm, Option<PhotoUpload>), AppError> {
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == PHOTO_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read photo: {}", e)))?;

            photo = match file_name {
                Some(file_name) if !file_name.is_empty() && !bytes.is_empty() => Some(PhotoUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                }),
                _ => None,
            };
            continue;
        }

        match FormField::from_name(&name) {
            Some(form_field) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                form = reduce(form, form_field, FormValue::Text(text));
            }
            None => debug!("Ignoring unknown form field '{}'", name),
        }
    }

    Ok((form, photo))
}

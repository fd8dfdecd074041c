//! Edit-doctor flow

use docfinder_common::blob::BlobStore;
use docfinder_common::models::DoctorPatch;
use docfinder_common::store::RecordStore;
use docfinder_common::time::now_millis;
use serde::Serialize;
use tracing::{info, warn};

use super::{discard_photo, upload_photo, PhotoUpload};
use crate::error::AppError;
use crate::forms::DoctorForm;

/// A stored doctor loaded into the form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditForm {
    pub id: String,
    pub form: DoctorForm,
    /// Current photo, shown until a new one is chosen
    pub photo_url: Option<String>,
}

/// Load a doctor for editing
pub async fn load_for_edit(store: &dyn RecordStore, id: &str) -> Result<EditForm, AppError> {
    match store.get_doctor(id).await? {
        Some(doctor) => Ok(EditForm {
            id: doctor.id.clone(),
            form: DoctorForm::from_doctor(&doctor),
            photo_url: doctor.photo_url.clone(),
        }),
        None => {
            warn!("Edit requested for missing doctor {}", id);
            Err(AppError::NotFound("Doctor not found".to_string()))
        }
    }
}

/// Validate the form and write a partial update
///
/// The stored photo is only replaced when `photo` is Some. Returns the
/// patch that was written.
pub async fn submit_edit(
    store: &dyn RecordStore,
    blobs: &dyn BlobStore,
    id: &str,
    form: &DoctorForm,
    photo: Option<PhotoUpload>,
) -> Result<DoctorPatch, AppError> {
    let updated_at = now_millis();
    let mut patch = form.to_patch(updated_at)?;

    let stored = match &photo {
        Some(photo) => Some(upload_photo(blobs, photo, updated_at).await?),
        None => None,
    };
    patch.photo_url = stored.as_ref().map(|p| p.url.clone());

    match store.update_doctor(id, &patch).await {
        Ok(()) => {
            info!("Updated doctor {}", id);
            Ok(patch)
        }
        Err(e) => {
            if let Some(stored) = &stored {
                discard_photo(blobs, stored).await;
            }
            match e {
                docfinder_common::Error::NotFound(_) => {
                    Err(AppError::NotFound("Doctor not found".to_string()))
                }
                other => Err(other.into()),
            }
        }
    }
}

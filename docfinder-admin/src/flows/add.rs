//! Add-doctor flow

use docfinder_common::blob::BlobStore;
use docfinder_common::models::Doctor;
use docfinder_common::store::RecordStore;
use docfinder_common::time::now_millis;
use tracing::info;

use super::{discard_photo, upload_photo, PhotoUpload};
use crate::error::AppError;
use crate::forms::DoctorForm;

/// Validate the form, upload the photo if any, then create the record
///
/// Nothing reaches a collaborator when validation fails.
pub async fn add_doctor(
    store: &dyn RecordStore,
    blobs: &dyn BlobStore,
    form: &DoctorForm,
    photo: Option<PhotoUpload>,
) -> Result<Doctor, AppError> {
    let created_at = now_millis();
    let mut new_doctor = form.to_new_doctor(created_at)?;

    let stored = match &photo {
        Some(photo) => Some(upload_photo(blobs, photo, created_at).await?),
        None => None,
    };
    new_doctor.photo_url = stored.as_ref().map(|p| p.url.clone());

    match store.create_doctor(new_doctor).await {
        Ok(doctor) => {
            info!("Added doctor {} ({})", doctor.name, doctor.id);
            Ok(doctor)
        }
        Err(e) => {
            if let Some(stored) = &stored {
                discard_photo(blobs, stored).await;
            }
            Err(e.into())
        }
    }
}

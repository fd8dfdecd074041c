//! Record mutation flows
//!
//! Each flow validates first, uploads a photo when one was supplied, then
//! writes to the record store. A failed write after a successful upload
//! removes the uploaded object again.

pub mod add;
pub mod delete;
pub mod edit;

pub use add::add_doctor;
pub use delete::{DeleteConfirmations, PendingDelete};
pub use edit::{load_for_edit, submit_edit, EditForm};

use docfinder_common::blob::{sanitize_file_name, BlobLocation, BlobStore};
use tracing::{info, warn};

use crate::error::AppError;

/// Blob key prefix for doctor photos
pub const PHOTO_PREFIX: &str = "doctors";

/// A photo chosen in the form
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Photo stored in the blob store
pub(crate) struct StoredPhoto {
    pub location: BlobLocation,
    pub url: String,
}

/// Key for a photo uploaded at `epoch_ms`
pub fn photo_key(epoch_ms: i64, file_name: &str) -> String {
    format!("{}/{}_{}", PHOTO_PREFIX, epoch_ms, sanitize_file_name(file_name))
}

pub(crate) async fn upload_photo(
    blobs: &dyn BlobStore,
    photo: &PhotoUpload,
    epoch_ms: i64,
) -> Result<StoredPhoto, AppError> {
    let key = photo_key(epoch_ms, &photo.file_name);
    let location = blobs
        .upload(&key, &photo.bytes, photo.content_type.as_deref())
        .await?;
    let url = blobs.retrieval_url(&location);
    info!("Uploaded photo {} ({} bytes)", key, photo.bytes.len());
    Ok(StoredPhoto { location, url })
}

/// Remove a photo whose record write failed
pub(crate) async fn discard_photo(blobs: &dyn BlobStore, photo: &StoredPhoto) {
    match blobs.delete(&photo.location.key).await {
        Ok(()) => info!("Removed orphaned photo {}", photo.location.key),
        Err(e) => warn!("Failed to remove orphaned photo {}: {}", photo.location.key, e),
    }
}

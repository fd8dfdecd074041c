//! Blob storage collaborator
//!
//! Uploads bytes under a slash-separated key and resolves a retrieval URL
//! for the stored object. The filesystem adapter writes below a root folder
//! that the HTTP layer serves under a URL prefix.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

/// Where an uploaded object landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    pub key: String,
}

/// Object-storage operations
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key`, replacing any existing object
    async fn upload(&self, key: &str, bytes: &[u8], content_type: Option<&str>) -> Result<BlobLocation>;

    /// Public URL for a stored object
    fn retrieval_url(&self, location: &BlobLocation) -> String;

    /// Remove an object; missing objects are not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Blob store backed by a local directory
pub struct FsBlobStore {
    root: PathBuf,
    url_prefix: String,
}

impl FsBlobStore {
    /// `url_prefix` is the path the HTTP layer serves `root` under, e.g. `/blobs`
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |p, seg| p.join(seg)))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, key: &str, bytes: &[u8], content_type: Option<&str>) -> Result<BlobLocation> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Blob(format!("Failed to write {}: {}", key, e)))?;

        debug!(
            "Stored blob {} ({} bytes, {})",
            key,
            bytes.len(),
            content_type.unwrap_or("unknown type")
        );
        Ok(BlobLocation { key: key.to_string() })
    }

    fn retrieval_url(&self, location: &BlobLocation) -> String {
        format!("{}/{}", self.url_prefix, location.key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Blob(format!("Failed to delete {}: {}", key, e))),
        }
    }
}

/// Reject keys that could escape the root folder
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() < 512
        && key.split('/').all(|seg| {
            !seg.is_empty()
                && seg != "."
                && seg != ".."
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        });

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("Invalid blob key: {}", key)))
    }
}

/// Reduce an uploaded file name to characters valid in a blob key
///
/// Anything outside `[A-Za-z0-9._-]` becomes `_`; an empty result becomes
/// `upload`. Names longer than `MAX_FILE_NAME_LEN` are cut down, keeping a
/// short extension.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        truncate_file_name(cleaned)
    }
}

/// Longest sanitized file name kept in a blob key
pub const MAX_FILE_NAME_LEN: usize = 128;

// Input is ASCII only, so byte offsets are char boundaries
fn truncate_file_name(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_LEN {
        return name.to_string();
    }
    let ext = match name.rfind('.') {
        Some(dot) if name.len() - dot <= 16 => &name[dot..],
        _ => "",
    };
    let stem = &name[..MAX_FILE_NAME_LEN - ext.len()];
    format!("{}{}", stem.trim_end_matches('.'), ext)
}

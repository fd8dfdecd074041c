//! Record store collaborator
//!
//! Collection-scoped access to the `doctors` and `specialties` collections
//! plus a change stream that carries the full doctor collection after every
//! write. Subscribers always receive whole snapshots, never deltas.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::models::{Doctor, DoctorPatch, NewDoctor, SpecialtyRecord};
use crate::Result;

pub mod sqlite;

pub use sqlite::SqliteRecordStore;

/// Point-in-time copy of the whole `doctors` collection, in store order
pub type Snapshot = Arc<Vec<Doctor>>;

/// Receiving end of a collection change stream
///
/// Backed by a `watch` channel: a slow consumer skips intermediate snapshots
/// and always lands on the latest one.
pub struct SnapshotStream {
    rx: watch::Receiver<Snapshot>,
}

impl SnapshotStream {
    pub fn new(rx: watch::Receiver<Snapshot>) -> Self {
        Self { rx }
    }

    /// The latest snapshot, marking it as seen
    pub fn current(&mut self) -> Snapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next snapshot
    ///
    /// Returns None once the store has been dropped.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Document-store operations used by the admin service
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All doctors in store order
    async fn list_doctors(&self) -> Result<Vec<Doctor>>;

    /// One doctor by key, None when absent
    async fn get_doctor(&self, id: &str) -> Result<Option<Doctor>>;

    /// Insert under a store-assigned key
    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor>;

    /// Insert or replace under a caller-assigned key
    async fn put_doctor(&self, id: &str, doctor: NewDoctor) -> Result<Doctor>;

    /// Partial update of an existing doctor
    ///
    /// Fails with `Error::NotFound` when no record has this key.
    async fn update_doctor(&self, id: &str, patch: &DoctorPatch) -> Result<()>;

    /// Remove a doctor; deleting a missing key is not an error
    async fn delete_doctor(&self, id: &str) -> Result<()>;

    /// Entries of the `specialties` reference collection
    async fn list_specialties(&self) -> Result<Vec<SpecialtyRecord>>;

    /// Insert or replace a specialty reference entry
    async fn put_specialty(&self, record: &SpecialtyRecord) -> Result<()>;

    /// Subscribe to full-snapshot notifications for the `doctors` collection
    fn subscribe(&self) -> SnapshotStream;
}

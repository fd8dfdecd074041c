//! Two-phase delete
//!
//! A delete request only records an intent and hands back a token. The
//! store delete is issued when the token is confirmed; cancelling drops the
//! intent without touching the store.

use docfinder_common::models::Doctor;
use docfinder_common::store::RecordStore;
use docfinder_common::time::now_millis;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;

/// Intents older than this can no longer be confirmed
const INTENT_TTL_MS: i64 = 10 * 60 * 1000;

/// Delete awaiting confirmation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDelete {
    pub token: Uuid,
    pub doctor_id: String,
    pub doctor_name: String,
    pub requested_at: i64,
}

impl PendingDelete {
    /// Confirmation prompt shown to the user
    pub fn prompt(&self) -> String {
        format!("Are you sure you want to delete {}?", self.doctor_name)
    }
}

/// Outstanding delete intents, keyed by token
#[derive(Default)]
pub struct DeleteConfirmations {
    pending: Mutex<HashMap<Uuid, PendingDelete>>,
}

impl DeleteConfirmations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an intent to delete `doctor`
    pub fn request(&self, doctor: &Doctor) -> PendingDelete {
        let now = now_millis();
        let intent = PendingDelete {
            token: Uuid::new_v4(),
            doctor_id: doctor.id.clone(),
            doctor_name: doctor.name.clone(),
            requested_at: now,
        };

        let mut pending = self.lock();
        pending.retain(|_, p| now - p.requested_at < INTENT_TTL_MS);
        pending.insert(intent.token, intent.clone());
        debug!("Delete requested for {} (token {})", intent.doctor_id, intent.token);
        intent
    }

    /// Issue the store delete for a confirmed intent
    ///
    /// Expired intents are discarded without touching the store.
    pub async fn confirm(&self, store: &dyn RecordStore, token: Uuid) -> Result<PendingDelete, AppError> {
        let intent = self
            .lock()
            .remove(&token)
            .ok_or_else(|| AppError::NotFound("No pending delete for this token".to_string()))?;

        if now_millis() - intent.requested_at >= INTENT_TTL_MS {
            debug!("Delete of {} expired before confirmation", intent.doctor_id);
            return Err(AppError::NotFound("Delete request has expired".to_string()));
        }

        store.delete_doctor(&intent.doctor_id).await?;
        info!("Deleted doctor {} ({})", intent.doctor_name, intent.doctor_id);
        Ok(intent)
    }

    /// Drop an intent; true when one existed
    pub fn cancel(&self, token: Uuid) -> bool {
        let removed = self.lock().remove(&token);
        if let Some(intent) = &removed {
            debug!("Delete of {} cancelled", intent.doctor_id);
        }
        removed.is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, PendingDelete>> {
        // Each critical section is a single map operation, so poisoning is safe to ignore
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{doctor, MemoryStore};
    use docfinder_common::models::Specialty;

    fn setup() -> (MemoryStore, Doctor) {
        let d = doctor("doc-1", "Dr. Thato Kgosi", Some(Specialty::Urologist), Some(4), true);
        (MemoryStore::with_doctors(vec![d.clone()]), d)
    }

    #[tokio::test]
    async fn test_request_then_cancel_issues_no_store_calls() {
        let (store, d) = setup();
        let confirmations = DeleteConfirmations::new();

        let intent = confirmations.request(&d);
        assert_eq!(intent.prompt(), "Are you sure you want to delete Dr. Thato Kgosi?");
        assert!(confirmations.cancel(intent.token));

        assert!(store.calls().is_empty());
        assert_eq!(store.doctors().len(), 1);
        assert_eq!(confirmations.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_confirm_deletes_once() {
        let (store, d) = setup();
        let confirmations = DeleteConfirmations::new();
        let intent = confirmations.request(&d);

        let done = confirmations.confirm(&store, intent.token).await.unwrap();
        assert_eq!(done.doctor_id, "doc-1");
        assert_eq!(store.calls(), vec!["delete_doctor:doc-1".to_string()]);
        assert!(store.doctors().is_empty());

        // Token is spent
        let again = confirmations.confirm(&store, intent.token).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (store, _) = setup();
        let confirmations = DeleteConfirmations::new();

        assert!(!confirmations.cancel(Uuid::new_v4()));
        assert!(confirmations.confirm(&store, Uuid::new_v4()).await.is_err());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_confirm_is_noop() {
        let (store, d) = setup();
        let confirmations = DeleteConfirmations::new();
        let intent = confirmations.request(&d);

        confirmations.confirm(&store, intent.token).await.unwrap();
        assert!(!confirmations.cancel(intent.token));
    }

    #[tokio::test]
    async fn test_expired_intent_cannot_be_confirmed() {
        let (store, d) = setup();
        let confirmations = DeleteConfirmations::new();
        let intent = confirmations.request(&d);

        if let Some(p) = confirmations.lock().get_mut(&intent.token) {
            p.requested_at -= INTENT_TTL_MS;
        }

        let result = confirmations.confirm(&store, intent.token).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.calls().is_empty());
        assert_eq!(store.doctors().len(), 1);
        assert_eq!(confirmations.pending_count(), 0);
    }
}

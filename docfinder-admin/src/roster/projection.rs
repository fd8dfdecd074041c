//! Live roster projection
//!
//! A subscription to the record store's snapshot stream. Every snapshot
//! replaces the whole view: records in store order, distinct specialties in
//! first-seen order, and the two counts. Views are published through a
//! `watch` channel so readers always see one complete rebuild.

use docfinder_common::models::{Doctor, Specialty};
use docfinder_common::store::RecordStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Derived view of the doctor collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub doctors: Vec<Doctor>,
    /// Distinct specialties in the order they first appear in `doctors`
    pub specialties: Vec<Specialty>,
    pub doctor_count: usize,
    pub specialty_count: usize,
}

impl RosterView {
    pub fn from_snapshot(snapshot: &[Doctor]) -> Self {
        let mut specialties = Vec::new();
        for specialty in snapshot.iter().filter_map(|d| d.specialty) {
            if !specialties.contains(&specialty) {
                specialties.push(specialty);
            }
        }

        Self {
            doctors: snapshot.to_vec(),
            doctor_count: snapshot.len(),
            specialty_count: specialties.len(),
            specialties,
        }
    }
}

/// Read handle on the latest projected view
///
/// Keeps returning the last view after the subscription is cancelled.
#[derive(Clone)]
pub struct RosterReader {
    views: watch::Receiver<Arc<RosterView>>,
}

impl RosterReader {
    pub fn current(&self) -> Arc<RosterView> {
        self.views.borrow().clone()
    }
}

/// Active projection subscription
///
/// Owns the rebuild task. Dropping the subscription (or calling
/// `unsubscribe`) stops it.
pub struct RosterSubscription {
    views: watch::Receiver<Arc<RosterView>>,
    task: Option<JoinHandle<()>>,
}

impl RosterSubscription {
    /// Subscribe to `store` and build the first view from its current snapshot
    pub fn subscribe(store: &dyn RecordStore) -> Self {
        let mut snapshots = store.subscribe();
        let initial = Arc::new(RosterView::from_snapshot(&snapshots.current()));
        let (tx, views) = watch::channel(initial);

        let task = tokio::spawn(async move {
            while let Some(snapshot) = snapshots.next().await {
                let view = RosterView::from_snapshot(&snapshot);
                debug!(
                    "Roster rebuilt: {} doctors, {} specialties",
                    view.doctor_count, view.specialty_count
                );
                if tx.send(Arc::new(view)).is_err() {
                    break;
                }
            }
            info!("Roster change stream closed");
        });

        Self {
            views,
            task: Some(task),
        }
    }

    /// The latest view
    pub fn view(&self) -> Arc<RosterView> {
        self.views.borrow().clone()
    }

    pub fn reader(&self) -> RosterReader {
        RosterReader {
            views: self.views.clone(),
        }
    }

    /// Wait for the next rebuild
    ///
    /// Returns None once the rebuild task has ended.
    pub async fn changed(&mut self) -> Option<Arc<RosterView>> {
        self.views.changed().await.ok()?;
        Some(self.views.borrow_and_update().clone())
    }

    /// Stop receiving updates, keeping a reader on the last view
    pub fn unsubscribe(mut self) -> RosterReader {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.reader()
    }
}

impl Drop for RosterSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

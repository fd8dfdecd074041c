//! In-memory collaborators for unit tests
//!
//! Both fakes record every call so tests can assert exactly which
//! collaborator operations a flow issued.

use async_trait::async_trait;
use docfinder_common::blob::{BlobLocation, BlobStore};
use docfinder_common::models::{Doctor, DoctorPatch, NewDoctor, Specialty, SpecialtyRecord};
use docfinder_common::store::{RecordStore, Snapshot, SnapshotStream};
use docfinder_common::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Minimal doctor record for projection/report tests
pub(crate) fn doctor(
    id: &str,
    name: &str,
    specialty: Option<Specialty>,
    experience: Option<u32>,
    is_available: bool,
) -> Doctor {
    Doctor {
        id: id.to_string(),
        name: name.to_string(),
        specialty,
        email: format!("{}@example.com", id),
        phone: "+267 1234 5678".to_string(),
        address: format!("{} Main Mall", id),
        city: "Gaborone".to_string(),
        location: None,
        about: String::new(),
        education: String::new(),
        experience,
        is_available,
        accepts_insurance: false,
        photo_url: None,
        rating: 0.0,
        review_count: 0,
        created_at: 0,
        updated_at: None,
    }
}

pub(crate) struct MemoryStore {
    doctors: Mutex<Vec<Doctor>>,
    specialties: Mutex<Vec<SpecialtyRecord>>,
    calls: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
    next_id: AtomicUsize,
    snapshots: watch::Sender<Snapshot>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::with_doctors(Vec::new())
    }

    pub(crate) fn with_doctors(doctors: Vec<Doctor>) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(doctors.clone()));
        Self {
            doctors: Mutex::new(doctors),
            specialties: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            next_id: AtomicUsize::new(1),
            snapshots,
        }
    }

    /// Replace the collection and notify subscribers
    pub(crate) fn publish(&self, doctors: Vec<Doctor>) {
        *self.doctors.lock().unwrap() = doctors;
        self.notify();
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn doctors(&self) -> Vec<Doctor> {
        self.doctors.lock().unwrap().clone()
    }

    pub(crate) fn specialties(&self) -> Vec<SpecialtyRecord> {
        self.specialties.lock().unwrap().clone()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(Error::Internal("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn notify(&self) {
        self.snapshots.send_replace(Arc::new(self.doctors()));
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        self.record("list_doctors".to_string());
        Ok(self.doctors())
    }

    async fn get_doctor(&self, id: &str) -> Result<Option<Doctor>> {
        self.record(format!("get_doctor:{}", id));
        Ok(self.doctors().into_iter().find(|d| d.id == id))
    }

    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        self.record("create_doctor".to_string());
        self.check_write()?;
        let id = format!("gen-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let doctor = doctor.into_doctor(id);
        self.doctors.lock().unwrap().push(doctor.clone());
        self.notify();
        Ok(doctor)
    }

    async fn put_doctor(&self, id: &str, doctor: NewDoctor) -> Result<Doctor> {
        self.record(format!("put_doctor:{}", id));
        self.check_write()?;
        let doctor = doctor.into_doctor(id.to_string());
        {
            let mut doctors = self.doctors.lock().unwrap();
            doctors.retain(|d| d.id != id);
            doctors.push(doctor.clone());
        }
        self.notify();
        Ok(doctor)
    }

    async fn update_doctor(&self, id: &str, patch: &DoctorPatch) -> Result<()> {
        self.record(format!("update_doctor:{}", id));
        self.check_write()?;
        {
            let mut doctors = self.doctors.lock().unwrap();
            let doctor = doctors
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| Error::NotFound(format!("Doctor {}", id)))?;
            doctor.apply(patch);
        }
        self.notify();
        Ok(())
    }

    async fn delete_doctor(&self, id: &str) -> Result<()> {
        self.record(format!("delete_doctor:{}", id));
        self.check_write()?;
        self.doctors.lock().unwrap().retain(|d| d.id != id);
        self.notify();
        Ok(())
    }

    async fn list_specialties(&self) -> Result<Vec<SpecialtyRecord>> {
        self.record("list_specialties".to_string());
        Ok(self.specialties())
    }

    async fn put_specialty(&self, record: &SpecialtyRecord) -> Result<()> {
        self.record(format!("put_specialty:{}", record.id));
        self.check_write()?;
        let mut specialties = self.specialties.lock().unwrap();
        specialties.retain(|s| s.id != record.id);
        specialties.push(record.clone());
        Ok(())
    }

    fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshots.subscribe())
    }
}

#[derive(Default)]
pub(crate) struct MemoryBlobStore {
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
}

impl MemoryBlobStore {
    pub(crate) fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub(crate) fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub(crate) fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, _bytes: &[u8], _content_type: Option<&str>) -> Result<BlobLocation> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::Blob("storage unavailable".to_string()));
        }
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(BlobLocation { key: key.to_string() })
    }

    fn retrieval_url(&self, location: &BlobLocation) -> String {
        format!("/blobs/{}", location.key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

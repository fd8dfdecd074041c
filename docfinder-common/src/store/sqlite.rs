//! SQLite-backed record store
//!
//! Every successful write reloads the whole `doctors` table and publishes it
//! on the snapshot channel, which is how subscribers observe the effect of
//! writes issued elsewhere. Reload and send happen under one lock so the
//! last snapshot published always reflects the last committed write.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{RecordStore, Snapshot, SnapshotStream};
use crate::models::{Doctor, DoctorPatch, Location, NewDoctor, Specialty, SpecialtyRecord};
use crate::{Error, Result};

const DOCTOR_COLUMNS: &str = "id, name, specialty, email, phone, address, city, \
     latitude, longitude, about, education, experience, is_available, \
     accepts_insurance, photo_url, rating, review_count, created_at, updated_at";

/// Record store over the `doctors` and `specialties` tables
pub struct SqliteRecordStore {
    pool: SqlitePool,
    snapshots: watch::Sender<Snapshot>,
    publish_lock: Mutex<()>,
}

impl SqliteRecordStore {
    /// Open the store, loading the initial snapshot
    pub async fn open(pool: SqlitePool) -> Result<Self> {
        let initial = load_doctors(&pool).await?;
        debug!("Record store opened with {} doctors", initial.len());
        let (snapshots, _) = watch::channel(Arc::new(initial));
        Ok(Self {
            pool,
            snapshots,
            publish_lock: Mutex::new(()),
        })
    }

    /// Reload the collection and notify subscribers
    ///
    /// Runs after a committed write, so a failed reload is logged and the
    /// write still reports success. Subscribers catch up on the next write.
    async fn publish(&self) {
        let _guard = self.publish_lock.lock().await;
        match load_doctors(&self.pool).await {
            Ok(doctors) => {
                debug!(
                    "Publishing doctors snapshot ({} records) to {} subscribers",
                    doctors.len(),
                    self.snapshots.receiver_count()
                );
                self.snapshots.send_replace(Arc::new(doctors));
            }
            Err(e) => warn!("Failed to reload doctors snapshot after write: {}", e),
        }
    }

    async fn insert(&self, id: &str, doctor: &NewDoctor, replace: bool) -> Result<()> {
        let verb = if replace { "INSERT OR REPLACE" } else { "INSERT" };
        let sql = format!(
            "{} INTO doctors ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)",
            verb, DOCTOR_COLUMNS
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(&doctor.name)
            .bind(doctor.specialty.name())
            .bind(&doctor.email)
            .bind(&doctor.phone)
            .bind(&doctor.address)
            .bind(&doctor.city)
            .bind(doctor.location.map(|l| l.latitude))
            .bind(doctor.location.map(|l| l.longitude))
            .bind(&doctor.about)
            .bind(&doctor.education)
            .bind(doctor.experience.map(i64::from))
            .bind(doctor.is_available)
            .bind(doctor.accepts_insurance)
            .bind(&doctor.photo_url)
            .bind(doctor.rating)
            .bind(i64::from(doctor.review_count))
            .bind(doctor.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        load_doctors(&self.pool).await
    }

    async fn get_doctor(&self, id: &str) -> Result<Option<Doctor>> {
        let sql = format!("SELECT {} FROM doctors WHERE id = ?", DOCTOR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_doctor))
    }

    async fn create_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        let id = Uuid::new_v4().to_string();
        self.insert(&id, &doctor, false).await?;
        self.publish().await;
        Ok(doctor.into_doctor(id))
    }

    async fn put_doctor(&self, id: &str, doctor: NewDoctor) -> Result<Doctor> {
        self.insert(id, &doctor, true).await?;
        self.publish().await;
        Ok(doctor.into_doctor(id.to_string()))
    }

    async fn update_doctor(&self, id: &str, patch: &DoctorPatch) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE doctors SET
                name = ?, specialty = ?, email = ?, phone = ?, address = ?, city = ?,
                latitude = COALESCE(?, latitude),
                longitude = COALESCE(?, longitude),
                about = ?, education = ?, experience = ?,
                is_available = ?, accepts_insurance = ?,
                photo_url = COALESCE(?, photo_url),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.name)
        .bind(patch.specialty.name())
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.address)
        .bind(&patch.city)
        .bind(patch.location.map(|l| l.latitude))
        .bind(patch.location.map(|l| l.longitude))
        .bind(&patch.about)
        .bind(&patch.education)
        .bind(i64::from(patch.experience))
        .bind(patch.is_available)
        .bind(patch.accepts_insurance)
        .bind(&patch.photo_url)
        .bind(patch.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("doctor {}", id)));
        }

        self.publish().await;
        Ok(())
    }

    async fn delete_doctor(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!("Delete of missing doctor {} ignored", id);
            return Ok(());
        }

        self.publish().await;
        Ok(())
    }

    async fn list_specialties(&self) -> Result<Vec<SpecialtyRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, description, created_at FROM specialties ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SpecialtyRecord {
                id: row.get("id"),
                name: row.get("name"),
                description: row.get("description"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn put_specialty(&self, record: &SpecialtyRecord) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO specialties (id, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshots.subscribe())
    }
}

async fn load_doctors(pool: &SqlitePool) -> Result<Vec<Doctor>> {
    let sql = format!(
        "SELECT {} FROM doctors ORDER BY created_at, id",
        DOCTOR_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_doctor).collect())
}

fn row_to_doctor(row: &SqliteRow) -> Doctor {
    let id: String = row.get("id");

    let specialty = row
        .get::<Option<String>, _>("specialty")
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| {
            let parsed = Specialty::from_name(&s);
            if parsed.is_none() {
                warn!("Doctor {} has unknown specialty '{}'", id, s);
            }
            parsed
        });

    let location = Location::from_parts(
        row.get::<Option<f64>, _>("latitude"),
        row.get::<Option<f64>, _>("longitude"),
    );

    let experience = row
        .get::<Option<i64>, _>("experience")
        .and_then(|v| u32::try_from(v).ok());

    Doctor {
        id,
        name: row.get("name"),
        specialty,
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        city: row.get("city"),
        location,
        about: row.get("about"),
        education: row.get("education"),
        experience,
        is_available: row.get("is_available"),
        accepts_insurance: row.get("accepts_insurance"),
        photo_url: row.get("photo_url"),
        rating: row.get("rating"),
        review_count: u32::try_from(row.get::<i64, _>("review_count")).unwrap_or(0),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

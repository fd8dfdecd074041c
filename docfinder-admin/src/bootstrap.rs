//! First-start data seeding
//!
//! An empty `doctors` collection gets the specialty reference entries and
//! two sample doctors. Nothing here ever aborts startup: every failure is
//! logged and the service comes up with whatever was written.

use docfinder_common::config::AdminConfig;
use docfinder_common::identity::SqliteIdentity;
use docfinder_common::models::{
    doctor_key_from_email, Location, NewDoctor, Specialty, SpecialtyRecord,
};
use docfinder_common::store::RecordStore;
use docfinder_common::time::now_millis;
use docfinder_common::Result;
use tracing::{error, info, warn};

/// What `initialize_database` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Collection already had records
    AlreadyPopulated,
    Seeded,
    /// Could not even read the collection
    Failed,
}

/// Seed an empty store
pub async fn initialize_database(store: &dyn RecordStore) -> SeedOutcome {
    info!("Initializing database...");

    let existing = match store.list_doctors().await {
        Ok(doctors) => doctors,
        Err(e) => {
            error!("Error initializing database: {}", e);
            return SeedOutcome::Failed;
        }
    };

    if !existing.is_empty() {
        info!("Database already has data ({} doctors)", existing.len());
        return SeedOutcome::AlreadyPopulated;
    }

    info!("Database is empty, initializing with sample data...");
    if let Err(e) = initialize_specialties(store).await {
        error!("Error initializing specialties: {}", e);
    }
    if let Err(e) = add_sample_doctors(store).await {
        error!("Error adding sample doctors: {}", e);
    }
    info!("Database initialized");
    SeedOutcome::Seeded
}

/// Write the specialty reference entries unless some already exist
async fn initialize_specialties(store: &dyn RecordStore) -> Result<()> {
    if !store.list_specialties().await?.is_empty() {
        return Ok(());
    }

    for specialty in Specialty::ALL {
        store
            .put_specialty(&SpecialtyRecord::for_specialty(specialty, now_millis()))
            .await?;
    }
    info!("Specialties initialized ({})", Specialty::ALL.len());
    Ok(())
}

async fn add_sample_doctors(store: &dyn RecordStore) -> Result<()> {
    for doctor in sample_doctors(now_millis()) {
        let key = doctor_key_from_email(&doctor.email);
        store.put_doctor(&key, doctor).await?;
    }
    info!("Sample doctors added");
    Ok(())
}

/// The two demonstration records
pub fn sample_doctors(created_at: i64) -> Vec<NewDoctor> {
    vec![
        NewDoctor {
            name: "Dr. John Smith".to_string(),
            specialty: Specialty::Cardiologist,
            email: "john.smith@example.com".to_string(),
            phone: "+267 1234 5678".to_string(),
            address: "123 Medical Plaza, Gaborone".to_string(),
            city: "Gaborone".to_string(),
            location: Some(Location {
                latitude: -24.6282,
                longitude: 25.9231,
            }),
            about: "Experienced cardiologist with 10 years of practice.".to_string(),
            education: "MD from University of Botswana".to_string(),
            experience: Some(10),
            is_available: true,
            accepts_insurance: true,
            photo_url: None,
            rating: 4.5,
            review_count: 0,
            created_at,
        },
        NewDoctor {
            name: "Dr. Sarah Johnson".to_string(),
            specialty: Specialty::Dentist,
            email: "sarah.johnson@example.com".to_string(),
            phone: "+267 8765 4321".to_string(),
            address: "456 Dental Center, Gaborone".to_string(),
            city: "Gaborone".to_string(),
            location: Some(Location {
                latitude: -24.6532,
                longitude: 25.9231,
            }),
            about: "General dentist providing comprehensive dental care.".to_string(),
            education: "DDS from University of Cape Town".to_string(),
            experience: Some(8),
            is_available: true,
            accepts_insurance: true,
            photo_url: None,
            rating: 4.8,
            review_count: 0,
            created_at,
        },
    ]
}

/// Create the configured administrator when no account exists
pub async fn ensure_admin_user(identity: &SqliteIdentity, admin: &AdminConfig) {
    match identity.user_count().await {
        Ok(0) => match identity.create_user(&admin.email, &admin.password).await {
            Ok(()) => {
                info!("Created administrator account {}", admin.email);
                if admin.password == AdminConfig::default().password {
                    warn!("Administrator is using the default password; set [admin] password in docfinder.toml");
                }
            }
            Err(e) => error!("Failed to create administrator account: {}", e),
        },
        Ok(n) => info!("{} user account(s) present", n),
        Err(e) => error!("Failed to count user accounts: {}", e),
    }
}

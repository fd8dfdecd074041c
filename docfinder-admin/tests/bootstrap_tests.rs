//! First-start seeding against a real SQLite store

use docfinder_admin::bootstrap::{ensure_admin_user, initialize_database, SeedOutcome};
use docfinder_common::config::AdminConfig;
use docfinder_common::db::init_database;
use docfinder_common::identity::{IdentityClient, SqliteIdentity};
use docfinder_common::models::{Location, Specialty};
use docfinder_common::store::{RecordStore, SqliteRecordStore};
use std::time::Duration;

#[tokio::test]
async fn test_seed_once_then_leave_alone() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("docfinder.db")).await.unwrap();
    let store = SqliteRecordStore::open(pool).await.unwrap();

    assert_eq!(initialize_database(&store).await, SeedOutcome::Seeded);
    assert_eq!(initialize_database(&store).await, SeedOutcome::AlreadyPopulated);

    let doctors = store.list_doctors().await.unwrap();
    assert_eq!(doctors.len(), 2);

    let smith = store.get_doctor("john_smith@example_com").await.unwrap().unwrap();
    assert_eq!(smith.name, "Dr. John Smith");
    assert_eq!(smith.specialty, Some(Specialty::Cardiologist));
    assert_eq!(smith.experience, Some(10));
    assert_eq!(
        smith.location,
        Some(Location {
            latitude: -24.6282,
            longitude: 25.9231
        })
    );

    let johnson = store.get_doctor("sarah_johnson@example_com").await.unwrap().unwrap();
    assert_eq!(johnson.specialty, Some(Specialty::Dentist));
    assert_eq!(johnson.rating, 4.8);

    let specialties = store.list_specialties().await.unwrap();
    assert_eq!(specialties.len(), 20);
    assert!(specialties.iter().any(|s| s.id == "Plastic_Surgeon"));
}

#[tokio::test]
async fn test_admin_account_created_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("docfinder.db")).await.unwrap();
    let identity = SqliteIdentity::new(pool, Duration::from_secs(60));

    let admin = AdminConfig {
        email: "root@clinic.example".to_string(),
        password: "first".to_string(),
    };
    ensure_admin_user(&identity, &admin).await;

    let changed = AdminConfig {
        email: "other@clinic.example".to_string(),
        password: "second".to_string(),
    };
    ensure_admin_user(&identity, &changed).await;

    assert_eq!(identity.user_count().await.unwrap(), 1);
    assert!(identity.sign_in("root@clinic.example", "first").await.is_ok());
    assert!(identity.sign_in("other@clinic.example", "second").await.is_err());
}

//! Integration tests for the SQLite identity service

use docfinder_common::db::init_database;
use docfinder_common::identity::{IdentityClient, SessionEvent, SqliteIdentity};
use docfinder_common::Error;
use std::time::Duration;

async fn open_identity(timeout: Duration) -> (tempfile::TempDir, SqliteIdentity) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("test.db")).await.unwrap();
    let identity = SqliteIdentity::new(pool, timeout);
    identity
        .create_user("Admin@Example.com", "s3cret")
        .await
        .unwrap();
    (dir, identity)
}

#[tokio::test]
async fn test_sign_in_and_resolve_session() {
    let (_dir, identity) = open_identity(Duration::from_secs(60)).await;
    assert_eq!(identity.user_count().await.unwrap(), 1);

    let session = identity.sign_in("admin@example.com", "s3cret").await.unwrap();
    assert_eq!(session.user_email, "admin@example.com");

    let resolved = identity.current_session(&session.token).await.unwrap();
    assert_eq!(resolved, Some(session));
}

#[tokio::test]
async fn test_sign_in_is_case_insensitive_on_email() {
    let (_dir, identity) = open_identity(Duration::from_secs(60)).await;
    assert!(identity.sign_in("  ADMIN@example.COM ", "s3cret").await.is_ok());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_rejected() {
    let (_dir, identity) = open_identity(Duration::from_secs(60)).await;

    let wrong = identity.sign_in("admin@example.com", "nope").await;
    assert!(matches!(wrong, Err(Error::Unauthorized(_))));

    let unknown = identity.sign_in("who@example.com", "s3cret").await;
    assert!(matches!(unknown, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_sign_out_ends_session() {
    let (_dir, identity) = open_identity(Duration::from_secs(60)).await;
    let session = identity.sign_in("admin@example.com", "s3cret").await.unwrap();

    identity.sign_out(&session.token).await.unwrap();
    assert!(identity.current_session(&session.token).await.unwrap().is_none());

    // Unknown token is ignored
    identity.sign_out("not-a-token").await.unwrap();
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let (_dir, identity) = open_identity(Duration::from_millis(0)).await;
    let session = identity.sign_in("admin@example.com", "s3cret").await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(identity.current_session(&session.token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_transitions_are_observed() {
    let (_dir, identity) = open_identity(Duration::from_secs(60)).await;
    let mut events = identity.watch_sessions();

    let session = identity.sign_in("admin@example.com", "s3cret").await.unwrap();
    identity.sign_out(&session.token).await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::SignedIn {
            email: "admin@example.com".to_string()
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::SignedOut {
            email: "admin@example.com".to_string()
        }
    );
}

#[tokio::test]
async fn test_duplicate_user_rejected() {
    let (_dir, identity) = open_identity(Duration::from_secs(60)).await;
    assert!(identity.create_user("admin@example.com", "other").await.is_err());
    assert!(identity.create_user("", "pw").await.is_err());
}

#[tokio::test]
async fn test_stored_hash_is_pbkdf2_with_work_factor() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("test.db")).await.unwrap();
    let identity = SqliteIdentity::new(pool.clone(), Duration::from_secs(60));
    identity.create_user("admin@example.com", "s3cret").await.unwrap();

    let stored: String =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE email = 'admin@example.com'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(stored.starts_with("pbkdf2-sha256$600000$"));
    assert!(!stored.contains("s3cret"));
    assert!(identity.sign_in("admin@example.com", "s3cret").await.is_ok());
}

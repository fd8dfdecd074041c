//! SQLite-backed identity service
//!
//! Users live in the `users` table with salted PBKDF2 hashes; sessions are
//! rows in `sessions` keyed by a random UUID token and expire after the
//! configured timeout.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use super::password::{generate_salt, hash_password, verify_password};
use super::{IdentityClient, Session, SessionEvent};
use crate::time::now_millis;
use crate::{Error, Result};

/// Identity service over the `users` and `sessions` tables
pub struct SqliteIdentity {
    pool: SqlitePool,
    session_timeout: Duration,
    events: broadcast::Sender<SessionEvent>,
}

impl SqliteIdentity {
    pub fn new(pool: SqlitePool, session_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            pool,
            session_timeout,
            events,
        }
    }

    /// Create a user account
    ///
    /// Emails are stored lowercased so sign-in is case-insensitive.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<()> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "User email and password must not be empty".to_string(),
            ));
        }

        let salt = generate_salt();
        let hash = hash_password(password, &salt);

        sqlx::query(
            "INSERT INTO users (guid, email, password_hash, password_salt, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&email)
        .bind(hash)
        .bind(salt)
        .bind(now_millis())
        .execute(&self.pool)
        .await?;

        info!("Created user account {}", email);
        Ok(())
    }

    /// Number of user accounts
    pub async fn user_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    fn timeout_millis(&self) -> i64 {
        i64::try_from(self.session_timeout.as_millis()).unwrap_or(i64::MAX)
    }

    fn emit(&self, event: SessionEvent) {
        // No observers is fine
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl IdentityClient for SqliteIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);

        let row = sqlx::query("SELECT guid, password_hash, password_salt FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            debug!("Sign-in rejected: unknown user {}", email);
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        };

        let hash: String = row.get("password_hash");
        let salt: String = row.get("password_salt");
        if !verify_password(password, &salt, &hash) {
            debug!("Sign-in rejected: wrong password for {}", email);
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }

        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_email: email.clone(),
            created_at: now_millis(),
        };

        sqlx::query("INSERT INTO sessions (token, user_guid, created_at) VALUES (?, ?, ?)")
            .bind(&session.token)
            .bind(row.get::<String, _>("guid"))
            .bind(session.created_at)
            .execute(&self.pool)
            .await?;

        self.emit(SessionEvent::SignedIn { email });
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let email: Option<String> = sqlx::query_scalar(
            "SELECT u.email FROM sessions s JOIN users u ON s.user_guid = u.guid WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        if let Some(email) = email {
            self.emit(SessionEvent::SignedOut { email });
        }
        Ok(())
    }

    async fn current_session(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT s.token, s.created_at, u.email FROM sessions s \
             JOIN users u ON s.user_guid = u.guid WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let session = Session {
            token: row.get("token"),
            user_email: row.get("email"),
            created_at: row.get("created_at"),
        };

        if now_millis().saturating_sub(session.created_at) > self.timeout_millis() {
            debug!("Session for {} expired", session.user_email);
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            self.emit(SessionEvent::SignedOut {
                email: session.user_email,
            });
            return Ok(None);
        }

        Ok(Some(session))
    }

    fn watch_sessions(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

//! Identity collaborator
//!
//! Sign-in, sign-out and session lookup. Session transitions are broadcast
//! so the service can observe (and log) every sign-in and sign-out.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::Result;

pub mod password;
pub mod sqlite;

pub use sqlite::SqliteIdentity;

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// Opaque bearer token carried in the session cookie
    pub token: String,
    pub user_email: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// Session transition notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    SignedIn { email: String },
    SignedOut { email: String },
}

/// Authentication service operations
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Verify credentials and open a session
    ///
    /// Fails with `Error::Unauthorized` on unknown email or wrong password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Close a session; unknown tokens are ignored
    async fn sign_out(&self, token: &str) -> Result<()>;

    /// Resolve a token to its live session, None if unknown or expired
    async fn current_session(&self, token: &str) -> Result<Option<Session>>;

    /// Observe session transitions
    fn watch_sessions(&self) -> broadcast::Receiver<SessionEvent>;
}

//! Authentication collaborator: turns credentials into an explicit [`Session`].

pub mod local;

use std::io;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::UserId;

pub use local::LocalAuthenticator;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("The email {0} is already in use")]
    EmailInUse(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Session is no longer active")]
    SessionExpired,
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("authentication unavailable: {0}")]
    Unavailable(String),
}

/// Resolved identity handed to every ledger and period operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub session_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            session_id: Uuid::new_v4(),
            issued_at: Utc::now(),
        }
    }
}

/// Issues and revokes sessions.
pub trait Authenticator: Send + Sync {
    /// Creates credentials for a new account and signs it in.
    fn register(&self, name: &str, email: &str, password: &str) -> Result<Session, AuthError>;

    fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    fn sign_out(&self, session: &Session) -> Result<(), AuthError>;

    fn is_active(&self, session: &Session) -> bool;
}

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{domain::UserId, store::json_backend::write_atomic};

use super::{AuthError, Authenticator, Session};

pub const DEFAULT_PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Credential {
    user_id: UserId,
    email: String,
    password_hash: String,
}

#[derive(Debug, Default)]
struct AuthState {
    credentials: HashMap<String, Credential>,
    active: HashSet<Uuid>,
}

/// Email/password authenticator with bcrypt-hashed credentials, optionally
/// persisted to a JSON file.
#[derive(Debug)]
pub struct LocalAuthenticator {
    state: Mutex<AuthState>,
    path: Option<PathBuf>,
    cost: u32,
}

impl LocalAuthenticator {
    pub fn in_memory(cost: u32) -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            path: None,
            cost,
        }
    }

    /// Opens (or starts) a credential table stored at `path`.
    pub fn open(path: PathBuf, cost: u32) -> Result<Self, AuthError> {
        let credentials = if path.exists() {
            let data = fs::read_to_string(&path)?;
            let entries: Vec<Credential> = serde_json::from_str(&data)?;
            entries
                .into_iter()
                .map(|entry| (normalize_email(&entry.email), entry))
                .collect()
        } else {
            HashMap::new()
        };
        Ok(Self {
            state: Mutex::new(AuthState {
                credentials,
                active: HashSet::new(),
            }),
            path: Some(path),
            cost,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, AuthState>, AuthError> {
        self.state
            .lock()
            .map_err(|_| AuthError::Unavailable("credential lock poisoned".into()))
    }

    fn persist(&self, state: &AuthState) -> Result<(), AuthError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut entries: Vec<&Credential> = state.credentials.values().collect();
        entries.sort_by(|a, b| a.email.cmp(&b.email));
        let json = serde_json::to_string_pretty(&entries)?;
        write_atomic(path, &json)?;
        Ok(())
    }
}

impl Authenticator for LocalAuthenticator {
    fn register(&self, name: &str, email: &str, password: &str) -> Result<Session, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let key = normalize_email(email);
        let mut state = self.lock()?;
        if state.credentials.contains_key(&key) {
            return Err(AuthError::EmailInUse(email.trim().to_string()));
        }
        let credential = Credential {
            user_id: UserId::generate(),
            email: email.trim().to_string(),
            password_hash: bcrypt::hash(password, self.cost)?,
        };
        let session = Session::new(credential.user_id.clone(), credential.email.clone());
        state.credentials.insert(key.clone(), credential);
        if let Err(err) = self.persist(&state) {
            state.credentials.remove(&key);
            tracing::warn!(error = %err, "credential table not saved, registration dropped");
            return Err(err);
        }
        state.active.insert(session.session_id);
        tracing::info!(user = %session.user_id, "registered account");
        Ok(session)
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut state = self.lock()?;
        let credential = state
            .credentials
            .get(&normalize_email(email))
            .ok_or(AuthError::InvalidCredentials)?;
        if !bcrypt::verify(password, &credential.password_hash)? {
            tracing::debug!("rejected sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        let session = Session::new(credential.user_id.clone(), credential.email.clone());
        state.active.insert(session.session_id);
        tracing::info!(user = %session.user_id, "signed in");
        Ok(session)
    }

    fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        if !state.active.remove(&session.session_id) {
            return Err(AuthError::SessionExpired);
        }
        tracing::info!(user = %session.user_id, "signed out");
        Ok(())
    }

    fn is_active(&self, session: &Session) -> bool {
        self.lock()
            .map(|state| state.active.contains(&session.session_id))
            .unwrap_or(false)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

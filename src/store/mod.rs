//! Per-user document store consumed by the ledger and period components.

pub mod json_backend;
pub mod memory;

use std::io;

use thiserror::Error;

use crate::domain::{UserFields, UserId, UserRecord};

pub use json_backend::JsonDocumentStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no document for user {0}")]
    NotFound(UserId),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Abstraction over the remote document database keyed by user id.
///
/// Documents are read wholesale and updated per top-level field. There is no
/// version check: the last write wins.
pub trait RemoteStore: Send + Sync {
    /// Reads the full user aggregate.
    fn fetch(&self, user_id: &UserId) -> Result<UserRecord, StoreError>;

    /// Merge-updates the named fields of an existing document.
    fn write_fields(&self, user_id: &UserId, fields: &UserFields) -> Result<(), StoreError>;

    /// Writes a whole document, replacing any existing one.
    fn create(&self, user_id: &UserId, record: &UserRecord) -> Result<(), StoreError>;
}

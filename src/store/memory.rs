use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
};

use tracing::debug;

use crate::domain::{UserFields, UserId, UserRecord};

use super::{RemoteStore, StoreError};

/// In-process document store. Writes can be forced to fail to exercise
/// divergence between local and remote state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<UserId, UserRecord>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with a single document.
    pub fn with_record(user_id: UserId, record: UserRecord) -> Self {
        let store = Self::new();
        if let Ok(mut documents) = store.documents.lock() {
            documents.insert(user_id, record);
        }
        store
    }

    /// Makes every following `write_fields`/`create` call fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls since creation, failed ones included.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Current stored document, bypassing write-failure injection.
    pub fn document(&self, user_id: &UserId) -> Option<UserRecord> {
        self.lock().ok()?.get(user_id).cloned()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, UserRecord>>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Unavailable("document lock poisoned".into()))
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes are disabled".into()));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn fetch(&self, user_id: &UserId) -> Result<UserRecord, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.lock()?
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.clone()))
    }

    fn write_fields(&self, user_id: &UserId, fields: &UserFields) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut documents = self.lock()?;
        let record = documents
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.clone()))?;
        if fields.is_empty() {
            debug!(user = %user_id, "empty update skipped");
            return Ok(());
        }
        fields.apply_to(record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(user = %user_id, fields = ?fields.field_names(), "document updated");
        Ok(())
    }

    fn create(&self, user_id: &UserId, record: &UserRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.lock()?.insert(user_id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

//! The folder collection and its write-through to the document store.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::{
    auth::Session,
    core::{time::Clock, validate},
    domain::{Folder, FolderId, UserFields, UserId, UserRecord},
    errors::{BudgetError, BudgetResult},
    store::RemoteStore,
};

/// Changes applied by [`BudgetLedger::update_folder`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub allocated_budget: Option<f64>,
}

/// Copy of the folder list and its dirty flag, used to roll back local state
/// after a failed write.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    folders: Vec<Folder>,
    dirty: bool,
}

impl LedgerSnapshot {
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }
}

/// `total_budget` minus everything spent across `folders`. Folder allocations are ignored.
pub fn remaining_budget(total_budget: f64, folders: &[Folder]) -> f64 {
    total_budget - total_spent(folders)
}

pub fn total_spent(folders: &[Folder]) -> f64 {
    folders.iter().map(|folder| folder.spent_so_far).sum()
}

/// Owns the in-memory folder list of one user.
///
/// Every mutation updates local state first, then writes the whole list back
/// to the store. A failed write is reported as [`BudgetError::Persistence`] and
/// local state is kept; the ledger stays dirty until [`BudgetLedger::sync`]
/// succeeds or the caller restores a snapshot taken while it was clean.
///
/// Mutations are refused with [`BudgetError::NotLoaded`] until the ledger has
/// been loaded, so an unread document is never overwritten.
pub struct BudgetLedger {
    store: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
    owner: Option<UserId>,
    folders: Vec<Folder>,
    dirty: bool,
}

impl BudgetLedger {
    pub fn new(store: Arc<dyn RemoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            owner: None,
            folders: Vec::new(),
            dirty: false,
        }
    }

    /// Replaces local state with the folders currently stored for the session's user.
    pub fn load(&mut self, session: &Session) -> BudgetResult<&[Folder]> {
        let record = self
            .store
            .fetch(&session.user_id)
            .map_err(|err| BudgetError::from_store("load folders", err))?;
        Ok(self.load_from(session, &record))
    }

    /// Seeds local state from a document the caller already fetched for `session`.
    pub fn load_from(&mut self, session: &Session, record: &UserRecord) -> &[Folder] {
        debug!(user = %session.user_id, count = record.folders.len(), "loaded folders");
        self.owner = Some(session.user_id.clone());
        self.folders = record.folders.clone();
        self.dirty = false;
        &self.folders
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|folder| &folder.id == id)
    }

    /// True when local folders differ from what the store last acknowledged.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn add_folder(
        &mut self,
        session: &Session,
        name: &str,
        allocated_budget: f64,
    ) -> BudgetResult<FolderId> {
        self.ensure_owner(session)?;
        let name = validate::folder_name(name)?;
        validate::ensure_non_negative(allocated_budget, "allocated budget")?;

        let id = self.next_id();
        self.folders
            .push(Folder::new(id.clone(), name.clone(), allocated_budget));
        info!(folder = %id, %name, allocated_budget, "added folder");

        self.write_through(session, "add folder")?;
        Ok(id)
    }

    /// Adds `amount` to the folder's spend and returns the folder's new remaining allocation.
    pub fn post_expense(
        &mut self,
        session: &Session,
        folder_id: &FolderId,
        amount: f64,
    ) -> BudgetResult<f64> {
        self.ensure_owner(session)?;
        validate::ensure_non_negative(amount, "expense amount")?;

        let folder = self
            .folders
            .iter_mut()
            .find(|folder| &folder.id == folder_id)
            .ok_or_else(|| BudgetError::FolderNotFound(folder_id.clone()))?;
        // The running total must stay serializable.
        validate::ensure_finite(folder.spent_so_far + amount, "total spent")?;
        folder.record_spend(amount);
        let remaining = folder.remaining();
        if folder.is_overspent() {
            info!(folder = %folder_id, remaining, "folder is overspent");
        }
        info!(folder = %folder_id, amount, "posted expense");

        self.write_through(session, "record expense")?;
        Ok(remaining)
    }

    pub fn update_folder(
        &mut self,
        session: &Session,
        folder_id: &FolderId,
        update: FolderUpdate,
    ) -> BudgetResult<()> {
        self.ensure_owner(session)?;
        let name = update
            .name
            .as_deref()
            .map(validate::folder_name)
            .transpose()?;
        if let Some(amount) = update.allocated_budget {
            validate::ensure_non_negative(amount, "allocated budget")?;
        }

        let folder = self
            .folders
            .iter_mut()
            .find(|folder| &folder.id == folder_id)
            .ok_or_else(|| BudgetError::FolderNotFound(folder_id.clone()))?;
        if let Some(name) = name {
            folder.name = name;
        }
        if let Some(amount) = update.allocated_budget {
            folder.allocated_budget = amount;
        }
        info!(folder = %folder_id, "updated folder");

        self.write_through(session, "update folder")
    }

    /// Removes the folder. An unknown id is a no-op: `Ok(None)` and no remote write.
    pub fn delete_folder(
        &mut self,
        session: &Session,
        folder_id: &FolderId,
    ) -> BudgetResult<Option<Folder>> {
        self.ensure_owner(session)?;
        let Some(index) = self.folders.iter().position(|folder| &folder.id == folder_id) else {
            debug!(folder = %folder_id, "delete ignored, folder not present");
            return Ok(None);
        };
        let removed = self.folders.remove(index);
        info!(folder = %folder_id, name = %removed.name, "deleted folder");

        self.write_through(session, "delete folder")?;
        Ok(Some(removed))
    }

    /// Retries the write-through of the current folder list.
    pub fn sync(&mut self, session: &Session) -> BudgetResult<()> {
        self.ensure_owner(session)?;
        self.write_through(session, "sync folders")
    }

    pub fn compute_remaining_budget(&self, total_budget: f64) -> f64 {
        remaining_budget(total_budget, &self.folders)
    }

    pub fn total_spent(&self) -> f64 {
        total_spent(&self.folders)
    }

    pub fn total_allocated(&self) -> f64 {
        self.folders
            .iter()
            .map(|folder| folder.allocated_budget)
            .sum()
    }

    /// Part of `total_budget` not yet allocated to any folder.
    pub fn unallocated_budget(&self, total_budget: f64) -> f64 {
        total_budget - self.total_allocated()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            folders: self.folders.clone(),
            dirty: self.dirty,
        }
    }

    /// Puts local state and the dirty flag back to `snapshot`. Does not write to the store.
    pub fn restore(&mut self, snapshot: LedgerSnapshot) {
        debug!(count = snapshot.folders.len(), dirty = snapshot.dirty, "restored folder snapshot");
        self.folders = snapshot.folders;
        self.dirty = snapshot.dirty;
    }

    fn ensure_owner(&self, session: &Session) -> BudgetResult<()> {
        match &self.owner {
            Some(owner) if owner == &session.user_id => Ok(()),
            Some(_) => Err(BudgetError::SessionMismatch),
            None => Err(BudgetError::NotLoaded),
        }
    }

    fn write_through(&mut self, session: &Session, operation: &'static str) -> BudgetResult<()> {
        let fields = UserFields::folders(self.folders.clone());
        match self.store.write_fields(&session.user_id, &fields) {
            Ok(()) => {
                self.dirty = false;
                debug!(operation, count = self.folders.len(), "folders written through");
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                warn!(operation, error = %err, "write-through failed, local folders not persisted");
                Err(BudgetError::from_store(operation, err))
            }
        }
    }

    fn next_id(&self) -> FolderId {
        let mut created_at = self.clock.now();
        loop {
            let candidate = FolderId::from_timestamp(created_at);
            if self.folder(&candidate).is_none() {
                return candidate;
            }
            created_at += Duration::milliseconds(1);
        }
    }
}

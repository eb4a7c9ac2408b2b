use thiserror::Error;

use crate::{
    auth::AuthError,
    domain::{FolderId, UserId},
    store::StoreError,
};

pub type BudgetResult<T> = Result<T, BudgetError>;

/// Error type surfaced by ledger and budget period operations.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Folder not found: {0}")]
    FolderNotFound(FolderId),
    #[error("User record not found: {0}")]
    UserNotFound(UserId),
    #[error("Failed to {operation}: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("Operation issued for a different user than the one loaded")]
    SessionMismatch,
    #[error("Folders have not been loaded for this session")]
    NotLoaded,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl BudgetError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        BudgetError::Validation(message.into())
    }

    /// Maps a store failure, turning a missing document into [`BudgetError::UserNotFound`].
    pub(crate) fn from_store(operation: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::NotFound(user_id) => BudgetError::UserNotFound(user_id),
            source => BudgetError::Persistence { operation, source },
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, BudgetError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BudgetError::FolderNotFound(_) | BudgetError::UserNotFound(_)
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, BudgetError::Persistence { .. })
    }
}

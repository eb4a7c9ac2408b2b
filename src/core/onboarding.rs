//! Account creation and entry routing.

use tracing::{info, warn};

use crate::{
    auth::{Authenticator, Session},
    domain::UserRecord,
    errors::{BudgetError, BudgetResult},
    store::RemoteStore,
};

/// Where a signed-in user lands first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRoute {
    /// No budget configured yet.
    BudgetSetup,
    Home,
}

impl EntryRoute {
    pub fn for_record(record: &UserRecord) -> Self {
        if record.budget_set {
            EntryRoute::Home
        } else {
            EntryRoute::BudgetSetup
        }
    }
}

/// Registers credentials and creates the user document holding only `name` and `email`.
pub fn register_account(
    auth: &dyn Authenticator,
    store: &dyn RemoteStore,
    name: &str,
    email: &str,
    password: &str,
) -> BudgetResult<Session> {
    let session = auth.register(name, email, password)?;
    let record = UserRecord::new(name.trim(), email.trim());
    if let Err(err) = store.create(&session.user_id, &record) {
        warn!(user = %session.user_id, error = %err, "credentials created but user document was not");
        return Err(BudgetError::from_store("create the account", err));
    }
    info!(user = %session.user_id, "account created");
    Ok(session)
}

/// Fetches the user's document and decides where they should land.
pub fn entry_route(store: &dyn RemoteStore, session: &Session) -> BudgetResult<EntryRoute> {
    let record = store
        .fetch(&session.user_id)
        .map_err(|err| BudgetError::from_store("load profile", err))?;
    Ok(EntryRoute::for_record(&record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::LocalAuthenticator, store::MemoryStore};

    #[test]
    fn new_accounts_route_to_setup() {
        let auth = LocalAuthenticator::in_memory(4);
        let store = MemoryStore::new();
        let session =
            register_account(&auth, &store, "Ada", "ada@example.com", "hunter2").unwrap();

        let stored = store.document(&session.user_id).unwrap();
        assert_eq!(stored, UserRecord::new("Ada", "ada@example.com"));
        assert_eq!(entry_route(&store, &session).unwrap(), EntryRoute::BudgetSetup);
    }

    #[test]
    fn configured_accounts_route_home() {
        let mut record = UserRecord::new("Ada", "ada@example.com");
        record.budget_set = true;
        assert_eq!(EntryRoute::for_record(&record), EntryRoute::Home);
    }

    #[test]
    fn missing_fields_surface_as_auth_errors() {
        let auth = LocalAuthenticator::in_memory(4);
        let store = MemoryStore::new();
        let err = register_account(&auth, &store, "", "ada@example.com", "pw").unwrap_err();
        assert!(matches!(err, BudgetError::Auth(_)));
    }
}

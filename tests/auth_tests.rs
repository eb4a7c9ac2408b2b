mod common;

use budget_folders::{
    auth::{AuthError, Authenticator, LocalAuthenticator},
    core::{entry_route, register_account, EntryRoute},
    store::MemoryStore,
    BudgetError,
};
use common::TEST_PASSWORD_COST;
use tempfile::tempdir;

#[test]
fn credentials_survive_reopening_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let registered = {
        let auth = LocalAuthenticator::open(path.clone(), TEST_PASSWORD_COST).unwrap();
        auth.register("Ada", "ada@example.com", "hunter2").unwrap()
    };

    let reopened = LocalAuthenticator::open(path.clone(), TEST_PASSWORD_COST).unwrap();
    let session = reopened.authenticate("ADA@example.com", "hunter2").unwrap();
    assert_eq!(session.user_id, registered.user_id);
    // Sessions are not persisted.
    assert!(!reopened.is_active(&registered));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("hunter2"));
}

#[test]
fn duplicate_email_is_rejected() {
    let auth = LocalAuthenticator::in_memory(TEST_PASSWORD_COST);
    let store = MemoryStore::new();
    register_account(&auth, &store, "Ada", "ada@example.com", "pw").unwrap();
    let err = register_account(&auth, &store, "Other", " Ada@Example.com ", "pw").unwrap_err();
    assert!(matches!(err, BudgetError::Auth(AuthError::EmailInUse(_))));
}

#[test]
fn registration_requires_every_field() {
    let auth = LocalAuthenticator::in_memory(TEST_PASSWORD_COST);
    for (name, email, password) in [("", "a@b.c", "pw"), ("Ada", " ", "pw"), ("Ada", "a@b.c", "")] {
        assert!(matches!(
            auth.register(name, email, password),
            Err(AuthError::MissingFields)
        ));
    }
}

#[test]
fn new_account_lands_on_budget_setup() {
    let auth = LocalAuthenticator::in_memory(TEST_PASSWORD_COST);
    let store = MemoryStore::new();
    let session = register_account(&auth, &store, "Ada", "ada@example.com", "pw").unwrap();
    assert_eq!(entry_route(&store, &session).unwrap(), EntryRoute::BudgetSetup);
}

#[test]
fn unknown_email_is_invalid_credentials() {
    let auth = LocalAuthenticator::in_memory(TEST_PASSWORD_COST);
    assert!(matches!(
        auth.authenticate("nobody@example.com", "pw"),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn failed_save_does_not_reserve_the_email() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, "").unwrap();
    let auth =
        LocalAuthenticator::open(blocker.join("credentials.json"), TEST_PASSWORD_COST).unwrap();

    assert!(matches!(
        auth.register("Ada", "ada@example.com", "hunter2"),
        Err(AuthError::Io(_))
    ));
    assert!(matches!(
        auth.authenticate("ada@example.com", "hunter2"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.register("Ada", "ada@example.com", "hunter2"),
        Err(AuthError::Io(_))
    ));
}

#[test]
fn saving_credentials_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let auth = LocalAuthenticator::open(path.clone(), TEST_PASSWORD_COST).unwrap();
    auth.register("Ada", "ada@example.com", "hunter2").unwrap();
    auth.register("Grace", "grace@example.com", "hopper").unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["credentials.json".to_string()]);
}

mod common;

use std::sync::Arc;

use budget_folders::{
    auth::Session,
    core::{BudgetLedger, FolderUpdate, PeriodInput, SummaryService},
    domain::{Folder, FolderId, PeriodState, UserId, UserRecord},
    store::MemoryStore,
    BudgetError,
};
use common::{date, fixed_clock, fixture};

#[test]
fn add_folder_appends_one_fresh_folder() {
    let mut fx = fixture();
    let first = fx.ledger.add_folder(&fx.session, "Rent", 600.0).unwrap();
    let before: Vec<FolderId> = fx.ledger.folders().iter().map(|f| f.id.clone()).collect();

    let second = fx.ledger.add_folder(&fx.session, "Groceries", 200.0).unwrap();

    assert_eq!(fx.ledger.folders().len(), before.len() + 1);
    assert!(!before.contains(&second));
    assert_ne!(first, second);
    let added = fx.ledger.folder(&second).unwrap();
    assert_eq!(added.spent_so_far, 0.0);
    assert_eq!(added.name, "Groceries");

    let stored = fx.store.document(&fx.session.user_id).unwrap();
    assert_eq!(stored.folders, fx.ledger.folders());
}

#[test]
fn expenses_only_touch_their_folder() {
    let mut fx = fixture();
    let rent = fx.ledger.add_folder(&fx.session, "Rent", 600.0).unwrap();
    let food = fx.ledger.add_folder(&fx.session, "Food", 200.0).unwrap();
    fx.ledger.post_expense(&fx.session, &rent, 100.0).unwrap();
    let rent_before = fx.ledger.folder(&rent).cloned().unwrap();

    fx.ledger.post_expense(&fx.session, &food, 12.5).unwrap();
    fx.ledger.post_expense(&fx.session, &food, 7.5).unwrap();

    assert_eq!(fx.ledger.folder(&food).unwrap().spent_so_far, 20.0);
    assert_eq!(fx.ledger.folder(&rent), Some(&rent_before));
}

#[test]
fn remaining_budget_subtracts_spend_not_allocation() {
    let mut fx = fixture();
    let food = fx.ledger.add_folder(&fx.session, "Food", 100.0).unwrap();
    let fun = fx.ledger.add_folder(&fx.session, "Fun", 100.0).unwrap();
    fx.ledger.post_expense(&fx.session, &food, 50.0).unwrap();
    fx.ledger.post_expense(&fx.session, &fun, 120.0).unwrap();

    assert_eq!(fx.ledger.compute_remaining_budget(500.0), 330.0);
    assert_eq!(fx.ledger.total_spent(), 170.0);
}

#[test]
fn setup_folder_and_expense_scenario() {
    let mut fx = fixture();
    fx.periods
        .setup(
            &fx.session,
            PeriodInput::new(1000.0, date(2025, 1, 1), date(2025, 1, 31)),
        )
        .unwrap();
    let groceries = fx.ledger.add_folder(&fx.session, "Groceries", 200.0).unwrap();
    let remaining = fx.ledger.post_expense(&fx.session, &groceries, 45.0).unwrap();

    assert_eq!(remaining, 155.0);
    assert_eq!(fx.ledger.folder(&groceries).unwrap().remaining(), 155.0);
    let total = fx.periods.read().budget_amount;
    assert_eq!(fx.ledger.compute_remaining_budget(total), 955.0);

    let stored = fx.store.document(&fx.session.user_id).unwrap();
    assert!(stored.budget_set);
    let summary = SummaryService::profile(&stored);
    assert_eq!(summary.remaining_budget, 955.0);
    assert_eq!(summary.start_date, Some(date(2025, 1, 1)));
}

#[test]
fn deleting_an_unknown_folder_is_a_no_op() {
    let mut fx = fixture();
    fx.ledger.add_folder(&fx.session, "Rent", 600.0).unwrap();
    let writes = fx.store.write_count();

    let removed = fx
        .ledger
        .delete_folder(&fx.session, &FolderId::new("missing"))
        .unwrap();

    assert!(removed.is_none());
    assert_eq!(fx.ledger.folders().len(), 1);
    assert_eq!(fx.store.write_count(), writes);
}

#[test]
fn delete_removes_folder_locally_and_remotely() {
    let mut fx = fixture();
    let rent = fx.ledger.add_folder(&fx.session, "Rent", 600.0).unwrap();
    let removed = fx.ledger.delete_folder(&fx.session, &rent).unwrap();
    assert_eq!(removed.map(|f| f.name), Some("Rent".to_string()));
    assert!(fx.store.document(&fx.session.user_id).unwrap().folders.is_empty());
}

#[test]
fn failed_write_keeps_local_state_until_sync() {
    let mut fx = fixture();
    fx.store.set_fail_writes(true);

    let err = fx.ledger.add_folder(&fx.session, "Rent", 600.0).unwrap_err();

    assert!(err.is_persistence());
    assert_eq!(fx.ledger.folders().len(), 1);
    assert!(fx.ledger.is_dirty());
    assert!(fx.store.document(&fx.session.user_id).unwrap().folders.is_empty());

    fx.store.set_fail_writes(false);
    fx.ledger.sync(&fx.session).unwrap();
    assert!(!fx.ledger.is_dirty());
    assert_eq!(fx.store.document(&fx.session.user_id).unwrap().folders.len(), 1);
}

#[test]
fn snapshot_restore_rolls_back_a_failed_expense() {
    let mut fx = fixture();
    let food = fx.ledger.add_folder(&fx.session, "Food", 100.0).unwrap();
    let snapshot = fx.ledger.snapshot();
    fx.store.set_fail_writes(true);

    assert!(fx.ledger.post_expense(&fx.session, &food, 30.0).is_err());
    assert_eq!(fx.ledger.folder(&food).unwrap().spent_so_far, 30.0);

    fx.ledger.restore(snapshot);
    assert_eq!(fx.ledger.folder(&food).unwrap().spent_so_far, 0.0);
    assert!(!fx.ledger.is_dirty());
}

#[test]
fn invalid_folder_updates_change_nothing() {
    let mut fx = fixture();
    let rent = fx.ledger.add_folder(&fx.session, "Rent", 600.0).unwrap();
    let writes = fx.store.write_count();

    let blank_name = FolderUpdate {
        name: Some("   ".into()),
        allocated_budget: Some(700.0),
    };
    let negative = FolderUpdate {
        name: Some("Housing".into()),
        allocated_budget: Some(-5.0),
    };
    let not_a_number = FolderUpdate {
        name: None,
        allocated_budget: Some(f64::NAN),
    };
    for update in [blank_name, negative, not_a_number] {
        let err = fx.ledger.update_folder(&fx.session, &rent, update).unwrap_err();
        assert!(err.is_validation());
    }

    let folder = fx.ledger.folder(&rent).unwrap();
    assert_eq!(folder.name, "Rent");
    assert_eq!(folder.allocated_budget, 600.0);
    assert_eq!(fx.store.write_count(), writes);
}

#[test]
fn updating_an_unknown_folder_is_not_found() {
    let mut fx = fixture();
    let err = fx
        .ledger
        .update_folder(&fx.session, &FolderId::new("404"), FolderUpdate::default())
        .unwrap_err();
    assert!(matches!(err, BudgetError::FolderNotFound(_)));
}

#[test]
fn failed_delete_keeps_the_local_removal() {
    let mut fx = fixture();
    let rent = fx.ledger.add_folder(&fx.session, "Rent", 600.0).unwrap();
    fx.store.set_fail_writes(true);

    let err = fx.ledger.delete_folder(&fx.session, &rent).unwrap_err();
    assert!(err.is_persistence());
    assert!(err.to_string().starts_with("Failed to delete folder"));
    assert!(fx.ledger.folder(&rent).is_none());
    assert!(fx.ledger.is_dirty());
    assert_eq!(fx.store.document(&fx.session.user_id).unwrap().folders.len(), 1);

    fx.store.set_fail_writes(false);
    fx.ledger.sync(&fx.session).unwrap();
    assert!(fx.store.document(&fx.session.user_id).unwrap().folders.is_empty());
}

#[test]
fn failed_edit_leaves_snapshot_untouched() {
    let mut fx = fixture();
    fx.periods
        .setup(
            &fx.session,
            PeriodInput::new(1000.0, date(2025, 1, 1), date(2025, 1, 31)),
        )
        .unwrap();
    let before = fx.periods.read().clone();
    fx.store.set_fail_writes(true);

    let err = fx
        .periods
        .edit(
            &fx.session,
            PeriodInput::new(800.0, date(2025, 2, 1), date(2025, 2, 28)),
        )
        .unwrap_err();
    assert!(err.is_persistence());
    assert!(err.to_string().starts_with("Failed to update budget details"));
    assert_eq!(fx.periods.read(), &before);
    assert_eq!(fx.store.document(&fx.session.user_id).unwrap().budget_amount, 1000.0);
}

#[test]
fn mutations_before_loading_are_refused() {
    let user_id = UserId::new("ada-1");
    let mut record = UserRecord::new("Ada", "ada@example.com");
    record.folders.push(Folder::new(FolderId::new("1"), "Rent", 600.0));
    let store = Arc::new(MemoryStore::with_record(user_id.clone(), record));
    let session = Session::new(user_id.clone(), "ada@example.com");
    let mut ledger = BudgetLedger::new(store.clone(), fixed_clock());

    let err = ledger.add_folder(&session, "Food", 100.0).unwrap_err();
    assert!(matches!(err, BudgetError::NotLoaded));
    assert!(matches!(ledger.sync(&session), Err(BudgetError::NotLoaded)));
    assert_eq!(store.document(&user_id).unwrap().folders[0].name, "Rent");

    ledger.load(&session).unwrap();
    ledger.add_folder(&session, "Food", 100.0).unwrap();
    let names: Vec<String> = store
        .document(&user_id)
        .unwrap()
        .folders
        .into_iter()
        .map(|folder| folder.name)
        .collect();
    assert_eq!(names, vec!["Rent", "Food"]);
}

#[test]
fn failed_period_write_leaves_snapshot_untouched() {
    let mut fx = fixture();
    fx.store.set_fail_writes(true);
    let err = fx
        .periods
        .setup(
            &fx.session,
            PeriodInput::new(1000.0, date(2025, 1, 1), date(2025, 1, 31)),
        )
        .unwrap_err();
    assert!(err.is_persistence());
    assert!(err.to_string().starts_with("Failed to set the budget"));
    assert_eq!(fx.periods.state(), PeriodState::Unset);
}

#[test]
fn reads_are_idempotent() {
    let mut fx = fixture();
    fx.periods
        .setup(
            &fx.session,
            PeriodInput::new(750.0, date(2025, 3, 1), date(2025, 3, 31)),
        )
        .unwrap();
    let first = fx.periods.read().clone();
    let second = fx.periods.read().clone();
    assert_eq!(first, second);
    assert_eq!(fx.ledger.folders(), fx.ledger.folders());
}

#[test]
fn zero_amounts_are_accepted() {
    let mut fx = fixture();
    let empty = fx.ledger.add_folder(&fx.session, "Gifts", 0.0).unwrap();
    fx.ledger.post_expense(&fx.session, &empty, 0.0).unwrap();
    assert_eq!(fx.ledger.folder(&empty).unwrap().spent_so_far, 0.0);
    assert_eq!(fx.ledger.folder(&empty).unwrap().allocated_budget, 0.0);
}

#[test]
fn overspending_drives_remaining_negative() {
    let mut fx = fixture();
    let fun = fx.ledger.add_folder(&fx.session, "Fun", 50.0).unwrap();
    let remaining = fx.ledger.post_expense(&fx.session, &fun, 80.0).unwrap();
    assert_eq!(remaining, -30.0);
    assert!(fx.ledger.folder(&fun).unwrap().is_overspent());
}

#[test]
fn negative_expense_is_a_validation_error() {
    let mut fx = fixture();
    let fun = fx.ledger.add_folder(&fx.session, "Fun", 50.0).unwrap();
    let err = fx.ledger.post_expense(&fx.session, &fun, -5.0).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn expense_on_unknown_folder_is_not_found() {
    let mut fx = fixture();
    let err = fx
        .ledger
        .post_expense(&fx.session, &FolderId::new("nope"), 5.0)
        .unwrap_err();
    assert!(matches!(err, BudgetError::FolderNotFound(_)));
}

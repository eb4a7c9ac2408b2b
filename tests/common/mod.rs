#![allow(dead_code)]

use std::sync::Arc;

use budget_folders::{
    auth::Session,
    core::{BudgetLedger, ManualClock, PeriodManager},
    domain::{UserId, UserRecord},
    store::MemoryStore,
};
use chrono::{NaiveDate, TimeZone, Utc};

pub const TEST_PASSWORD_COST: u32 = 4;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
    ))
}

/// A user document named Ada, its session, and a ledger plus period manager over a memory store.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub session: Session,
    pub ledger: BudgetLedger,
    pub periods: PeriodManager,
}

pub fn fixture() -> Fixture {
    let user_id = UserId::new("ada-1");
    let store = Arc::new(MemoryStore::with_record(
        user_id.clone(),
        UserRecord::new("Ada", "ada@example.com"),
    ));
    let session = Session::new(user_id, "ada@example.com");
    let mut ledger = BudgetLedger::new(store.clone(), fixed_clock());
    ledger.load(&session).expect("load folders");
    let mut periods = PeriodManager::new(store.clone());
    periods.fetch(&session).expect("fetch period");
    Fixture {
        store,
        session,
        ledger,
        periods,
    }
}

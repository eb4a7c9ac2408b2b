//! The single budget amount and its date range.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    auth::Session,
    core::validate,
    domain::{BudgetPeriod, PeriodDates, PeriodState, UserFields, UserId, UserRecord},
    errors::{BudgetError, BudgetResult},
    store::RemoteStore,
};

/// Validated values for [`PeriodManager::setup`] and [`PeriodManager::edit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodInput {
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PeriodInput {
    pub fn new(amount: f64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            amount,
            start_date,
            end_date,
        }
    }

    /// Builds an input from raw text fields. Missing or unparseable values are rejected.
    pub fn parse(amount: &str, start_date: &str, end_date: &str) -> BudgetResult<Self> {
        Ok(Self {
            amount: validate::parse_amount(amount, "budget amount")?,
            start_date: validate::parse_date(start_date, "start date")?,
            end_date: validate::parse_date(end_date, "end date")?,
        })
    }

    fn validate(&self) -> BudgetResult<()> {
        validate::ensure_non_negative(self.amount, "budget amount")?;
        if self.dates().is_inverted() {
            warn!(start = %self.start_date, end = %self.end_date, "budget period ends before it starts");
        }
        Ok(())
    }

    fn dates(&self) -> PeriodDates {
        PeriodDates::new(self.start_date, self.end_date)
    }
}

/// Holds the last-fetched budget period and applies setup/edit flows.
///
/// `Unset --setup--> Set`, `Set --edit--> Set`. The local snapshot only changes
/// once the store has acknowledged the write.
pub struct PeriodManager {
    store: Arc<dyn RemoteStore>,
    owner: Option<UserId>,
    snapshot: BudgetPeriod,
}

impl PeriodManager {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            owner: None,
            snapshot: BudgetPeriod::unset(),
        }
    }

    /// Fetches the period from the store and caches it.
    pub fn fetch(&mut self, session: &Session) -> BudgetResult<&BudgetPeriod> {
        let record = self
            .store
            .fetch(&session.user_id)
            .map_err(|err| BudgetError::from_store("load budget", err))?;
        Ok(self.load_from(session, &record))
    }

    /// Caches the period of a document the caller already fetched for `session`.
    pub fn load_from(&mut self, session: &Session, record: &UserRecord) -> &BudgetPeriod {
        self.owner = Some(session.user_id.clone());
        self.snapshot = record.period();
        debug!(user = %session.user_id, state = %self.snapshot.state(), "fetched budget period");
        &self.snapshot
    }

    /// Last-fetched snapshot. Never contacts the store.
    pub fn read(&self) -> &BudgetPeriod {
        &self.snapshot
    }

    pub fn state(&self) -> PeriodState {
        self.snapshot.state()
    }

    /// Writes amount, period and `budgetSet=true` in one update.
    pub fn setup(&mut self, session: &Session, input: PeriodInput) -> BudgetResult<()> {
        self.ensure_owner(session)?;
        input.validate()?;
        let fields = UserFields::period(input.amount, input.dates()).with_budget_set(true);
        self.store
            .write_fields(&session.user_id, &fields)
            .map_err(|err| BudgetError::from_store("set the budget", err))?;

        self.owner = Some(session.user_id.clone());
        self.snapshot = BudgetPeriod {
            budget_amount: input.amount,
            dates: Some(input.dates()),
            budget_set: true,
        };
        info!(user = %session.user_id, amount = input.amount, "budget set up");
        Ok(())
    }

    /// Changes amount and period of an already configured budget.
    pub fn edit(&mut self, session: &Session, input: PeriodInput) -> BudgetResult<()> {
        self.ensure_owner(session)?;
        if self.snapshot.state() == PeriodState::Unset {
            return Err(BudgetError::validation(
                "budget has not been set up yet; run setup first",
            ));
        }
        input.validate()?;
        let fields = UserFields::period(input.amount, input.dates());
        self.store
            .write_fields(&session.user_id, &fields)
            .map_err(|err| BudgetError::from_store("update budget details", err))?;

        self.snapshot.budget_amount = input.amount;
        self.snapshot.dates = Some(input.dates());
        info!(user = %session.user_id, amount = input.amount, "budget updated");
        Ok(())
    }

    fn ensure_owner(&self, session: &Session) -> BudgetResult<()> {
        match &self.owner {
            Some(owner) if owner != &session.user_id => Err(BudgetError::SessionMismatch),
            _ => Ok(()),
        }
    }
}

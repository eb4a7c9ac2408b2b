//! Budget amount and the date range it applies to.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::iso_date;

/// Start and end of a budget period. `end_date` is not required to follow `start_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDates {
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(with = "iso_date")]
    pub end_date: NaiveDate,
}

impl PeriodDates {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn is_inverted(&self) -> bool {
        self.end_date < self.start_date
    }
}

impl fmt::Display for PeriodDates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start_date, self.end_date)
    }
}

/// Whether the user has configured a budget yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodState {
    Unset,
    Set,
}

impl fmt::Display for PeriodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodState::Unset => "Unset",
            PeriodState::Set => "Set",
        };
        f.write_str(label)
    }
}

/// Snapshot of the single active budget: amount, period and configuration flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetPeriod {
    pub budget_amount: f64,
    pub dates: Option<PeriodDates>,
    pub budget_set: bool,
}

impl BudgetPeriod {
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PeriodState {
        if self.budget_set {
            PeriodState::Set
        } else {
            PeriodState::Unset
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.dates.map(|dates| dates.start_date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.dates.map(|dates| dates.end_date)
    }
}

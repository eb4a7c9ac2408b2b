//! Read-only profile figures derived from a user record.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    core::ledger::{remaining_budget, total_spent},
    domain::{BudgetPeriod, Folder, FolderId, UserRecord},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderSummary {
    pub id: FolderId,
    pub name: String,
    pub allocated_budget: f64,
    pub spent_so_far: f64,
    pub remaining: f64,
    pub overspent: bool,
}

impl From<&Folder> for FolderSummary {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id.clone(),
            name: folder.name.clone(),
            allocated_budget: folder.allocated_budget,
            spent_so_far: folder.spent_so_far,
            remaining: folder.remaining(),
            overspent: folder.is_overspent(),
        }
    }
}

/// What the profile view shows: greeting, budget, period and spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub email: String,
    pub budget_set: bool,
    pub budget_amount: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_spent: f64,
    pub remaining_budget: f64,
    pub folders: Vec<FolderSummary>,
}

impl ProfileSummary {
    pub fn overspent_folders(&self) -> impl Iterator<Item = &FolderSummary> {
        self.folders.iter().filter(|folder| folder.overspent)
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn profile(record: &UserRecord) -> ProfileSummary {
        Self::from_parts(
            record.display_name(),
            &record.email,
            &record.period(),
            &record.folders,
        )
    }

    /// Builds a summary from locally held state rather than a fetched record.
    pub fn from_parts(
        name: &str,
        email: &str,
        period: &BudgetPeriod,
        folders: &[Folder],
    ) -> ProfileSummary {
        ProfileSummary {
            name: name.to_string(),
            email: email.to_string(),
            budget_set: period.budget_set,
            budget_amount: period.budget_amount,
            start_date: period.start_date(),
            end_date: period.end_date(),
            total_spent: total_spent(folders),
            remaining_budget: remaining_budget(period.budget_amount, folders),
            folders: folders.iter().map(FolderSummary::from).collect(),
        }
    }

    /// Days from `today` to the end of the period, inclusive. `None` without a period;
    /// zero once the end date has passed.
    pub fn days_left(period: &BudgetPeriod, today: NaiveDate) -> Option<i64> {
        let end = period.end_date()?;
        Some(((end - today).num_days() + 1).max(0))
    }
}

//! The per-user document that owns the budget period and folder list.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    folder::Folder,
    period::{BudgetPeriod, PeriodDates},
};

const DEFAULT_DISPLAY_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random user id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full user aggregate as persisted in the document store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub budget_set: bool,
    #[serde(default)]
    pub budget_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_period: Option<PeriodDates>,
    #[serde(default)]
    pub folders: Vec<Folder>,
}

impl UserRecord {
    /// Record written at registration: identity fields only.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            DEFAULT_DISPLAY_NAME
        } else {
            trimmed
        }
    }

    pub fn period(&self) -> BudgetPeriod {
        BudgetPeriod {
            budget_amount: self.budget_amount,
            dates: self.budget_period,
            budget_set: self.budget_set,
        }
    }
}

/// Partial update of top-level user fields. Unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_period: Option<PeriodDates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_set: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<Vec<Folder>>,
}

impl UserFields {
    /// Replaces the entire folder list.
    pub fn folders(folders: Vec<Folder>) -> Self {
        Self {
            folders: Some(folders),
            ..Self::default()
        }
    }

    /// Updates the budget amount and period together.
    pub fn period(budget_amount: f64, dates: PeriodDates) -> Self {
        Self {
            budget_amount: Some(budget_amount),
            budget_period: Some(dates),
            ..Self::default()
        }
    }

    pub fn with_budget_set(mut self, budget_set: bool) -> Self {
        self.budget_set = Some(budget_set);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Names of the fields this update touches, in persisted form.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.budget_amount.is_some() {
            names.push("budgetAmount");
        }
        if self.budget_period.is_some() {
            names.push("budgetPeriod");
        }
        if self.budget_set.is_some() {
            names.push("budgetSet");
        }
        if self.folders.is_some() {
            names.push("folders");
        }
        names
    }

    /// Merges the named fields into `record`.
    pub fn apply_to(&self, record: &mut UserRecord) {
        if let Some(amount) = self.budget_amount {
            record.budget_amount = amount;
        }
        if let Some(dates) = self.budget_period {
            record.budget_period = Some(dates);
        }
        if let Some(flag) = self.budget_set {
            record.budget_set = flag;
        }
        if let Some(folders) = &self.folders {
            record.folders = folders.clone();
        }
    }
}

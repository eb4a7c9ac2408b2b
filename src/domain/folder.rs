//! Domain types representing budget folders.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, NamedEntity};

/// Identifier of a folder, derived from its creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds the id for a folder created at `created_at` (epoch milliseconds).
    pub fn from_timestamp(created_at: DateTime<Utc>) -> Self {
        Self::from_millis(created_at.timestamp_millis())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FolderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A named sub-budget bucket with an allocation and accumulated spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub allocated_budget: f64,
    #[serde(default)]
    pub spent_so_far: f64,
}

impl Folder {
    pub fn new(id: FolderId, name: impl Into<String>, allocated_budget: f64) -> Self {
        Self {
            id,
            name: name.into(),
            allocated_budget,
            spent_so_far: 0.0,
        }
    }

    /// Allocation left in this folder. Negative when the folder is overspent.
    pub fn remaining(&self) -> f64 {
        self.allocated_budget - self.spent_so_far
    }

    pub fn is_overspent(&self) -> bool {
        self.spent_so_far > self.allocated_budget
    }

    pub(crate) fn record_spend(&mut self, amount: f64) {
        self.spent_so_far += amount;
    }
}

impl NamedEntity for Folder {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Folder {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.name, self.id)
    }
}

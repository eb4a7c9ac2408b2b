//! Input checks shared by the ledger and period components. All of them run
//! before any remote call is made.

use chrono::NaiveDate;

use crate::{
    domain::common::iso_date,
    errors::{BudgetError, BudgetResult},
};

/// Parses a user-entered amount. Blank input counts as missing.
pub fn parse_amount(input: &str, field: &str) -> BudgetResult<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::validation(format!("{field} is required")));
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| BudgetError::validation(format!("{field} must be a number, got `{trimmed}`")))?;
    ensure_finite(value, field)?;
    Ok(value)
}

/// Parses a `YYYY-MM-DD` date or an ISO-8601 date-time. Blank input counts as missing.
pub fn parse_date(input: &str, field: &str) -> BudgetResult<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::validation(format!("{field} is required")));
    }
    iso_date::parse(trimmed).ok_or_else(|| {
        BudgetError::validation(format!("{field} `{trimmed}` is not a valid date (use YYYY-MM-DD)"))
    })
}

pub fn ensure_finite(value: f64, field: &str) -> BudgetResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BudgetError::validation(format!("{field} must be a finite number")))
    }
}

/// Finite and not negative. Zero is allowed.
pub fn ensure_non_negative(value: f64, field: &str) -> BudgetResult<()> {
    ensure_finite(value, field)?;
    if value < 0.0 {
        return Err(BudgetError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

/// Returns the trimmed folder name, rejecting blank names.
pub fn folder_name(name: &str) -> BudgetResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::validation("folder name is required"));
    }
    Ok(trimmed.to_string())
}

//! Shared traits and serde helpers for budgeting primitives.

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Serde adapter for calendar dates stored as ISO-8601 date-time strings.
///
/// Dates are written as midnight UTC (`2025-01-31T00:00:00.000Z`). Reading
/// accepts either a full ISO date-time or a bare `YYYY-MM-DD` date and keeps
/// only the date part.
pub mod iso_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const STORED_FORMAT: &str = "%Y-%m-%dT00:00:00.000Z";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 date `{raw}`")))
    }

    /// Formats a date the way it is persisted.
    pub fn format(date: NaiveDate) -> String {
        date.format(STORED_FORMAT).to_string()
    }

    /// Parses either an RFC 3339 date-time or a plain calendar date.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(parsed.date_naive());
        }
        let date_part = trimmed.split('T').next().unwrap_or(trimmed);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

}

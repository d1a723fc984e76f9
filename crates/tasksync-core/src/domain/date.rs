//! Calendar dates as stored by the table service.
//!
//! Dates travel as ISO-8601 strings: either a full RFC 3339 timestamp or a
//! plain `YYYY-MM-DD`. The raw string is kept so values are written back
//! exactly as they were read; comparisons go through the parsed instant.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Parse a stored date. Date-only values are read as UTC midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a timestamp the way the sweep writes creation dates.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A date value: what the service sent, plus its parsed instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDate {
    pub raw: String,
    pub at: DateTime<Utc>,
}

impl StoredDate {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_timestamp(raw).map(|at| Self {
            raw: raw.to_string(),
            at,
        })
    }

    /// Whether a stored value (possibly absent or unparseable) differs from this one.
    pub fn differs_from(&self, stored: Option<&str>) -> bool {
        match stored.and_then(parse_timestamp) {
            Some(at) => at != self.at,
            None => true,
        }
    }
}

/// Project name -> most recent task creation date.
///
/// Rebuilt from scratch every run, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestDates {
    by_project: BTreeMap<String, StoredDate>,
}

impl LatestDates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `date` for `project` if it is later than what is already known.
    pub fn observe(&mut self, project: &str, date: StoredDate) {
        match self.by_project.get(project) {
            Some(current) if current.at >= date.at => {}
            _ => {
                self.by_project.insert(project.to_string(), date);
            }
        }
    }

    pub fn get(&self, project: &str) -> Option<&StoredDate> {
        self.by_project.get(project)
    }

    /// Entries ordered by project name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoredDate)> {
        self.by_project.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.by_project.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_project.is_empty()
    }
}

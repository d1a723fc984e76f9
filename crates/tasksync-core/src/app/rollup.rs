//! Rollup computation: latest task creation date per project.

use tracing::debug;

use crate::domain::{LatestDates, Record, StoredDate, TaskSchema};

/// Fold task records into project -> latest creation date.
///
/// Records without a project, without a creation date, or with a date that
/// does not parse are ignored.
pub fn latest_dates(records: &[Record], schema: &TaskSchema) -> LatestDates {
    let mut latest = LatestDates::new();
    let mut ignored = 0usize;

    for record in records {
        let project = record.select(&schema.project);
        let date = record.date(&schema.created).and_then(StoredDate::parse);
        match (project, date) {
            (Some(project), Some(date)) => latest.observe(project, date),
            _ => ignored += 1,
        }
    }

    debug!(projects = latest.len(), ignored, "rollup computed");
    latest
}

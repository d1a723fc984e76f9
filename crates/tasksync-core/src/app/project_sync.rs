//! Project table sync: bring the rollup table in line with the latest dates.
//!
//! Both passes work on the same fetched snapshot of the project table and
//! are not atomic: a failure leaves earlier writes in place.

use tracing::{info, warn};

use crate::domain::{
    DatabaseId, LatestDates, ProjectRollup, ProjectSchema, StepKind, StepOutcome, StepRecord,
};
use crate::ports::TableStore;

/// Create a rollup row for every project in `latest` that has none.
///
/// Rows are matched by exact project name.
pub async fn insert_missing(
    store: &dyn TableStore,
    projects: &DatabaseId,
    latest: &LatestDates,
    existing: &[ProjectRollup],
    schema: &ProjectSchema,
) -> Vec<StepRecord> {
    let mut steps = Vec::new();

    for (name, date) in latest.iter() {
        if existing.iter().any(|p| p.name.as_deref() == Some(name)) {
            continue;
        }

        let props = ProjectRollup::new_properties(name, date, schema);
        let outcome = match store.create(projects, props).await {
            Ok(id) => {
                info!(project = %name, record = %id, last_created = %date.raw, "project row added");
                StepOutcome::succeeded()
            }
            Err(e) => {
                warn!(project = %name, error = %e, "could not add project row");
                StepOutcome::failed(e.to_string())
            }
        };
        steps.push(StepRecord::new(StepKind::InsertProject, name, outcome));
    }

    steps
}

/// Overwrite the date of every row whose stored date differs from `latest`.
///
/// Rows whose project is unknown to `latest` are left untouched.
pub async fn update_changed(
    store: &dyn TableStore,
    latest: &LatestDates,
    existing: &[ProjectRollup],
    schema: &ProjectSchema,
) -> Vec<StepRecord> {
    let mut steps = Vec::new();

    for row in existing {
        let Some(name) = row.name.as_deref() else {
            continue;
        };
        let Some(date) = latest.get(name) else {
            continue;
        };
        if !date.differs_from(row.last_created.as_deref()) {
            continue;
        }

        let outcome = match store
            .update(&row.id, ProjectRollup::date_update(date, schema))
            .await
        {
            Ok(_) => {
                info!(
                    project = %name,
                    from = row.last_created.as_deref().unwrap_or("-"),
                    to = %date.raw,
                    "project date updated"
                );
                StepOutcome::succeeded()
            }
            Err(e) => {
                warn!(project = %name, record = %row.id, error = %e, "could not update project row");
                StepOutcome::failed(e.to_string())
            }
        };
        steps.push(StepRecord::new(StepKind::UpdateProject, name, outcome));
    }

    steps
}

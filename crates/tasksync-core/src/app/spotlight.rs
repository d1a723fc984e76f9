//! Spotlight - 最も放置されているアクティブなプロジェクトを再掲載
//!
//! spotlight テーブルは毎回作り直す: 既存行をすべて archive し、
//! 選ばれたプロジェクトを古い順に 1 行ずつ作成する。

use tracing::{info, warn};

use super::pagination::fetch_all;
use crate::domain::errors::StoreError;
use crate::domain::{
    DatabaseId, LatestDates, ProjectRollup, ProjectSchema, SpotlightEntry, SpotlightSchema,
    StepKind, StepOutcome, StepRecord, StoredDate,
};
use crate::ports::TableStore;

/// Number of projects shown in the spotlight.
pub const SPOTLIGHT_SIZE: usize = 3;

/// Pick up to `SPOTLIGHT_SIZE` projects with the oldest latest date.
///
/// Projects whose rollup row has the stop status are excluded; projects
/// without a row are eligible. Ties are broken by project name.
pub fn select_spotlight<'a>(
    latest: &'a LatestDates,
    rollups: &[ProjectRollup],
    schema: &ProjectSchema,
) -> Vec<(&'a str, &'a StoredDate)> {
    let stopped = |name: &str| {
        rollups
            .iter()
            .any(|r| r.name.as_deref() == Some(name) && r.is_stopped(schema))
    };

    // name order from the map, kept for equal dates by the stable sort
    let mut eligible: Vec<_> = latest.iter().filter(|(name, _)| !stopped(*name)).collect();
    eligible.sort_by_key(|(_, date)| date.at);
    eligible.truncate(SPOTLIGHT_SIZE);
    eligible
}

/// Settings of one republish.
pub struct Spotlight<'a> {
    pub store: &'a dyn TableStore,
    pub projects: &'a DatabaseId,
    pub spotlight: &'a DatabaseId,
    pub project_schema: &'a ProjectSchema,
    pub spotlight_schema: &'a SpotlightSchema,
    pub page_size: Option<u32>,
}

impl Spotlight<'_> {
    /// Replace the spotlight contents with the current selection.
    ///
    /// # Errors
    /// - fetching the project or spotlight table fails
    ///
    /// Archive and create failures are reported as failed steps instead.
    pub async fn republish(&self, latest: &LatestDates) -> Result<Vec<StepRecord>, StoreError> {
        let rollups: Vec<ProjectRollup> =
            fetch_all(self.store, self.projects, None, self.page_size)
                .await?
                .iter()
                .map(|r| ProjectRollup::from_record(r, self.project_schema))
                .collect();
        let selected = select_spotlight(latest, &rollups, self.project_schema);

        if selected.len() < SPOTLIGHT_SIZE {
            warn!(
                selected = selected.len(),
                wanted = SPOTLIGHT_SIZE,
                "not enough eligible projects for the spotlight"
            );
        }

        let current: Vec<SpotlightEntry> =
            fetch_all(self.store, self.spotlight, None, self.page_size)
                .await?
                .iter()
                .map(|r| SpotlightEntry::from_record(r, self.spotlight_schema))
                .collect();

        let mut steps = Vec::new();
        for entry in &current {
            let subject = entry.name.clone().unwrap_or_else(|| entry.id.to_string());
            let outcome = match self.store.archive(&entry.id).await {
                Ok(_) => StepOutcome::succeeded(),
                Err(e) => {
                    warn!(record = %entry.id, error = %e, "could not archive spotlight row");
                    StepOutcome::failed(e.to_string())
                }
            };
            steps.push(StepRecord::new(StepKind::ArchiveSpotlight, subject, outcome));
        }

        for (name, date) in &selected {
            let props = SpotlightEntry::new_properties(name, self.spotlight_schema);
            let outcome = match self.store.create(self.spotlight, props).await {
                Ok(_) => {
                    info!(project = %name, last_created = %date.raw, "project spotlighted");
                    StepOutcome::succeeded()
                }
                Err(e) => {
                    warn!(project = %name, error = %e, "could not publish spotlight row");
                    StepOutcome::failed(e.to_string())
                }
            };
            steps.push(StepRecord::new(StepKind::PublishSpotlight, *name, outcome));
        }

        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Properties, PropertyValue, RecordId};
    use crate::impls::{InMemoryTableStore, StoreOp};

    fn latest(pairs: &[(&str, &str)]) -> LatestDates {
        let mut latest = LatestDates::new();
        for (project, date) in pairs {
            latest.observe(project, StoredDate::parse(date).unwrap());
        }
        latest
    }

    fn rollup(name: &str, status: &str) -> ProjectRollup {
        ProjectRollup {
            id: RecordId::new(name),
            name: Some(name.into()),
            last_created: None,
            status: Some(status.into()),
        }
    }

    fn names<'a>(selected: &[(&'a str, &'a StoredDate)]) -> Vec<&'a str> {
        selected.iter().map(|(name, _)| *name).collect()
    }

    #[test]
    fn oldest_active_projects_first() {
        let dates = latest(&[
            ("A", "2024-01-05"),
            ("B", "2024-01-01"),
            ("C", "2024-02-01"),
            ("D", "2023-12-20"),
        ]);
        let rollups = vec![
            rollup("A", "active"),
            rollup("B", "stop"),
            rollup("C", "active"),
            rollup("D", "active"),
        ];

        let selected = select_spotlight(&dates, &rollups, &ProjectSchema::default());
        assert_eq!(names(&selected), vec!["D", "A", "C"]);
    }

    #[test]
    fn ties_are_broken_by_name() {
        let dates = latest(&[("Zeta", "2024-01-01"), ("Alpha", "2024-01-01"), ("Mid", "2024-01-01")]);
        let selected = select_spotlight(&dates, &[], &ProjectSchema::default());
        assert_eq!(names(&selected), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn projects_without_rollup_row_are_eligible() {
        let dates = latest(&[("A", "2024-01-01")]);
        let selected = select_spotlight(&dates, &[], &ProjectSchema::default());
        assert_eq!(names(&selected), vec!["A"]);
    }

    #[test]
    fn at_most_three() {
        let dates = latest(&[
            ("A", "2024-01-01"),
            ("B", "2024-01-02"),
            ("C", "2024-01-03"),
            ("D", "2024-01-04"),
            ("E", "2024-01-05"),
        ]);
        let selected = select_spotlight(&dates, &[], &ProjectSchema::default());
        assert_eq!(selected.len(), SPOTLIGHT_SIZE);
    }

    struct Fixture {
        store: InMemoryTableStore,
        projects: DatabaseId,
        spotlight: DatabaseId,
        project_schema: ProjectSchema,
        spotlight_schema: SpotlightSchema,
    }

    impl Fixture {
        fn new() -> Self {
            let projects = DatabaseId::new("projects");
            let spotlight = DatabaseId::new("spotlight");
            Self {
                store: InMemoryTableStore::new()
                    .with_table(projects.clone())
                    .with_table(spotlight.clone()),
                projects,
                spotlight,
                project_schema: ProjectSchema::default(),
                spotlight_schema: SpotlightSchema::default(),
            }
        }

        fn spotlight(&self) -> Spotlight<'_> {
            Spotlight {
                store: &self.store,
                projects: &self.projects,
                spotlight: &self.spotlight,
                project_schema: &self.project_schema,
                spotlight_schema: &self.spotlight_schema,
                page_size: None,
            }
        }

        async fn project(&self, name: &str, status: &str) {
            let mut props = Properties::new();
            props.insert(self.project_schema.name.clone(), PropertyValue::title(name));
            props.insert(self.project_schema.status.clone(), PropertyValue::select(status));
            self.store.seed(&self.projects, props).await.unwrap();
        }

        async fn shown(&self) -> Vec<String> {
            self.store
                .live_records(&self.spotlight)
                .await
                .iter()
                .filter_map(|r| r.text(&self.spotlight_schema.name).map(str::to_string))
                .collect()
        }
    }

    #[tokio::test]
    async fn republish_replaces_previous_rows() {
        let f = Fixture::new();
        for name in ["Old1", "Old2"] {
            f.store
                .seed(&f.spotlight, SpotlightEntry::new_properties(name, &f.spotlight_schema))
                .await
                .unwrap();
        }
        f.project("A", "active").await;
        f.project("B", "stop").await;
        f.project("C", "active").await;
        f.project("D", "active").await;

        let dates = latest(&[
            ("A", "2024-01-05"),
            ("B", "2024-01-01"),
            ("C", "2024-02-01"),
            ("D", "2023-12-20"),
        ]);
        let steps = f.spotlight().republish(&dates).await.unwrap();

        assert_eq!(f.shown().await, vec!["D", "A", "C"]);
        assert_eq!(f.store.all_records(&f.spotlight).await.len(), 5);
        let archived = steps
            .iter()
            .filter(|s| s.step == StepKind::ArchiveSpotlight)
            .count();
        assert_eq!(archived, 2);
    }

    #[tokio::test]
    async fn shortfall_is_not_an_error() {
        let f = Fixture::new();
        f.project("A", "active").await;

        let steps = f
            .spotlight()
            .republish(&latest(&[("A", "2024-01-01")]))
            .await
            .unwrap();

        assert_eq!(f.shown().await, vec!["A"]);
        assert!(steps.iter().all(|s| !s.outcome.is_failed()));
    }

    #[tokio::test]
    async fn empty_selection_clears_the_spotlight() {
        let f = Fixture::new();
        f.store
            .seed(&f.spotlight, SpotlightEntry::new_properties("Old", &f.spotlight_schema))
            .await
            .unwrap();

        f.spotlight().republish(&LatestDates::new()).await.unwrap();
        assert!(f.shown().await.is_empty());
    }

    #[tokio::test]
    async fn archive_failure_is_reported_and_publishing_continues() {
        let f = Fixture::new();
        f.store
            .seed(&f.spotlight, SpotlightEntry::new_properties("Old", &f.spotlight_schema))
            .await
            .unwrap();
        f.store.inject_failure(StoreOp::Archive, None).await;

        let steps = f
            .spotlight()
            .republish(&latest(&[("A", "2024-01-01")]))
            .await
            .unwrap();

        assert_eq!(steps.iter().filter(|s| s.outcome.is_failed()).count(), 1);
        assert_eq!(f.shown().await, vec!["Old", "A"]);
    }

    #[tokio::test]
    async fn unreadable_project_table_is_an_error() {
        let f = Fixture::new();
        f.store.inject_failure(StoreOp::Query, None).await;
        assert!(f.spotlight().republish(&LatestDates::new()).await.is_err());
        assert_eq!(f.store.calls().await.archive, 0);
    }
}

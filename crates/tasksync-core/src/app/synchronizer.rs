//! Synchronizer - 3 テーブルに対する 1 回の同期実行
//!
//! # フェーズ
//! 1. **sweep**: 完了タスクの日付記録と再作成（並行）
//! 2. **rollup**: 最新日付 → 不足プロジェクトの追加 → 変更プロジェクトの更新
//!    → spotlight の再掲載（逐次）
//!
//! ステップの失敗はフェーズレポートに集める。実行を中断するのは
//! 設定エラーとテーブル読み込みの失敗だけ。

use std::sync::Arc;

use tracing::info;

use super::pagination::fetch_all;
use super::project_sync::{insert_missing, update_changed};
use super::rollup::latest_dates;
use super::spotlight::Spotlight;
use super::sweep::CompletionSweep;
use super::worker_pool::WorkerPool;
use crate::config::DatabaseIds;
use crate::domain::errors::SyncError;
use crate::domain::{PhaseReport, ProjectRollup, RunReport, Schema};
use crate::ports::{Clock, TableStore};

pub const ROLLUP_PHASE: &str = "rollup";

/// Runs the sync. Built by [`super::SyncBuilder`].
pub struct Synchronizer {
    store: Arc<dyn TableStore>,
    ids: DatabaseIds,
    schema: Schema,
    sweep: CompletionSweep,
    page_size: Option<u32>,
}

impl Synchronizer {
    pub(crate) fn new(
        store: Arc<dyn TableStore>,
        clock: Arc<dyn Clock>,
        ids: DatabaseIds,
        schema: Schema,
        pool: WorkerPool,
        page_size: Option<u32>,
    ) -> Self {
        let sweep = CompletionSweep::new(
            Arc::clone(&store),
            clock,
            ids.tasks.clone(),
            schema.tasks.clone(),
            pool,
            page_size,
        );
        Self {
            store,
            ids,
            schema,
            sweep,
            page_size,
        }
    }

    pub fn databases(&self) -> &DatabaseIds {
        &self.ids
    }

    /// Sweep, then roll up.
    pub async fn run(&self) -> Result<RunReport, SyncError> {
        let sweep = self.sweep.run().await?;
        let rollup = self.sync_projects().await?;
        let report = RunReport { sweep, rollup };
        info!(failed = report.has_failures(), "sync run finished");
        Ok(report)
    }

    /// Rebuild the project table and the spotlight from the task table.
    ///
    /// # Errors
    /// - `SyncError::Config` if a table id is empty (before any call)
    /// - `SyncError::Store` if a table cannot be read
    #[tracing::instrument(skip_all)]
    pub async fn sync_projects(&self) -> Result<PhaseReport, SyncError> {
        self.ids.validate()?;
        let store = self.store.as_ref();

        let tasks = fetch_all(store, &self.ids.tasks, None, self.page_size).await?;
        let latest = latest_dates(&tasks, &self.schema.tasks);
        info!(tasks = tasks.len(), projects = latest.len(), "rollup computed");

        let existing: Vec<ProjectRollup> =
            fetch_all(store, &self.ids.projects, None, self.page_size)
                .await?
                .iter()
                .map(|r| ProjectRollup::from_record(r, &self.schema.projects))
                .collect();

        let mut report = PhaseReport::new(ROLLUP_PHASE);
        report.extend(
            insert_missing(
                store,
                &self.ids.projects,
                &latest,
                &existing,
                &self.schema.projects,
            )
            .await,
        );
        report.extend(update_changed(store, &latest, &existing, &self.schema.projects).await);

        let spotlight = Spotlight {
            store,
            projects: &self.ids.projects,
            spotlight: &self.ids.spotlight,
            project_schema: &self.schema.projects,
            spotlight_schema: &self.schema.spotlight,
            page_size: self.page_size,
        };
        report.extend(spotlight.republish(&latest).await?);

        let counts = report.counts();
        info!(
            succeeded = counts.succeeded,
            failed = counts.failed,
            "rollup finished"
        );
        Ok(report)
    }
}

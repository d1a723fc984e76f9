//! CompletionSweep - 完了タスクへの日付記録と次回タスクの作成
//!
//! # レコードごとの処理
//! 1. レコード ID を claim（1 回の実行で同じレコードは 1 度だけ）
//! 2. 作成日が無ければ記録
//! 3. one-shot でなければ、未完了の重複タスクを探す
//! 4. 重複が無ければ繰り返しキーを claim し、勝者が同じフィールド値で次のタスクを作成
//!
//! 各ステップは [`StepRecord`] を返す。失敗したステップが他のレコードを止めることはない。
//! sweep を中断するのは Done 集合の取得失敗だけ。
//!
//! # 学習ポイント
//! - `Arc` で共有するブランチ状態
//! - claim による first-claim-wins の重複排除

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::claims::{ClaimDecision, ClaimKey, ClaimTable, Resolution};
use super::pagination::fetch_all;
use super::worker_pool::WorkerPool;
use crate::domain::errors::SyncError;
use crate::domain::{
    DatabaseId, Filter, PhaseReport, Properties, PropertyValue, Record, StepKind, StepOutcome,
    StepRecord, TaskFields, TaskSchema, TaskStatus, format_timestamp,
};
use crate::ports::{Clock, QueryRequest, TableStore};

pub const PHASE: &str = "sweep";

/// The sweep over one task table.
pub struct CompletionSweep {
    store: Arc<dyn TableStore>,
    clock: Arc<dyn Clock>,
    tasks: DatabaseId,
    schema: TaskSchema,
    pool: WorkerPool,
    page_size: Option<u32>,
}

/// Everything a branch needs, shared by all branches of one run.
struct Branch {
    store: Arc<dyn TableStore>,
    tasks: DatabaseId,
    schema: TaskSchema,
    claims: ClaimTable,
    now: String,
}

impl CompletionSweep {
    pub fn new(
        store: Arc<dyn TableStore>,
        clock: Arc<dyn Clock>,
        tasks: DatabaseId,
        schema: TaskSchema,
        pool: WorkerPool,
        page_size: Option<u32>,
    ) -> Self {
        Self {
            store,
            clock,
            tasks,
            schema,
            pool,
            page_size,
        }
    }

    /// Run the sweep once.
    ///
    /// # Errors
    /// - `SyncError::Store` if the Done set cannot be fetched
    /// - `SyncError::Worker` if a branch panicked
    #[tracing::instrument(skip_all, fields(tasks = %self.tasks))]
    pub async fn run(&self) -> Result<PhaseReport, SyncError> {
        let done_filter = Filter::select_equals(&self.schema.status, &self.schema.done_label);
        let done = fetch_all(
            self.store.as_ref(),
            &self.tasks,
            Some(done_filter),
            self.page_size,
        )
        .await?;

        let now = format_timestamp(self.clock.now());
        info!(count = done.len(), %now, "sweeping completed tasks");

        let branch = Arc::new(Branch {
            store: Arc::clone(&self.store),
            tasks: self.tasks.clone(),
            schema: self.schema.clone(),
            claims: ClaimTable::new(),
            now,
        });

        let workers = Arc::clone(&branch);
        let results = self
            .pool
            .run(done, move |record| {
                let branch = Arc::clone(&workers);
                async move { branch.process(record).await }
            })
            .await?;

        let mut report = PhaseReport::new(PHASE);
        report.extend(results.into_iter().flatten());

        let counts = report.counts();
        let claims = branch.claims.tally().await;
        info!(
            succeeded = counts.succeeded,
            skipped = counts.skipped,
            failed = counts.failed,
            claimed = claims.total(),
            recreated = claims.created,
            recreate_failed = claims.failed,
            unresolved = claims.pending,
            "sweep finished"
        );
        Ok(report)
    }
}

impl Branch {
    async fn process(&self, record: Record) -> Vec<StepRecord> {
        let subject = record.id.to_string();
        let mut steps = Vec::new();

        if self.claims.claim(ClaimKey::Record(record.id.clone())).await == ClaimDecision::Lost {
            steps.push(StepRecord::new(
                StepKind::ClaimRecord,
                &subject,
                StepOutcome::skipped("record already handled in this run"),
            ));
            return steps;
        }

        let stamped = self.stamp_creation_date(&record).await;
        steps.push(StepRecord::new(StepKind::StampCreationDate, &subject, stamped));

        let recreated = self.recreate(&record).await;
        steps.push(StepRecord::new(StepKind::RecreateTask, &subject, recreated));

        self.claims
            .resolve(&ClaimKey::Record(record.id.clone()), Resolution::Done)
            .await;
        steps
    }

    /// Set the creation date to `now` if the current record has none.
    async fn stamp_creation_date(&self, record: &Record) -> StepOutcome {
        let current = match self.store.retrieve(&record.id).await {
            Ok(current) => current,
            Err(e) => {
                warn!(record = %record.id, error = %e, "could not read creation date");
                return StepOutcome::failed(e.to_string());
            }
        };

        if let Some(created) = current.date(&self.schema.created) {
            debug!(record = %record.id, %created, "creation date already set");
            return StepOutcome::skipped("creation date already set");
        }

        let mut props = Properties::new();
        props.insert(self.schema.created.clone(), PropertyValue::date(&self.now));
        match self.store.update(&record.id, props).await {
            Ok(_) => {
                info!(record = %record.id, "creation date stamped");
                StepOutcome::succeeded()
            }
            Err(e) => {
                warn!(record = %record.id, error = %e, "could not stamp creation date");
                StepOutcome::failed(e.to_string())
            }
        }
    }

    /// Create the next open occurrence of a recurring task.
    async fn recreate(&self, record: &Record) -> StepOutcome {
        let fields = TaskFields::from_record(record, &self.schema);
        if fields.is_one_shot(&self.schema) {
            return StepOutcome::skipped("one-shot task");
        }

        let request = QueryRequest {
            filter: Some(fields.open_duplicate_filter(&self.schema)),
            start_cursor: None,
            page_size: Some(1),
        };
        match self.store.query(&self.tasks, request).await {
            Ok(page) if !page.records.is_empty() => {
                return StepOutcome::skipped("open task already exists");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(record = %record.id, error = %e, "duplicate check failed");
                return StepOutcome::failed(e.to_string());
            }
        }

        let key = ClaimKey::Recurrence(fields.recurrence_key());
        if self.claims.claim(key.clone()).await == ClaimDecision::Lost {
            debug!(%key, "recurrence claimed by another branch");
            return StepOutcome::skipped("created by another branch");
        }

        let props = fields.to_properties(TaskStatus::NotDone, &self.schema);
        match self.store.create(&self.tasks, props).await {
            Ok(id) => {
                info!(record = %record.id, created = %id, title = %fields.title, "task recreated");
                self.claims.resolve(&key, Resolution::Created(id)).await;
                StepOutcome::succeeded()
            }
            Err(e) => {
                warn!(record = %record.id, error = %e, "could not recreate task");
                self.claims
                    .resolve(&key, Resolution::Failed(e.to_string()))
                    .await;
                StepOutcome::failed(e.to_string())
            }
        }
    }
}

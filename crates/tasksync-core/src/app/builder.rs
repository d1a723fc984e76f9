//! SyncBuilder - `Synchronizer` の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: `build()` が成功するまで store には触れない

use std::sync::Arc;

use crate::config::{DEFAULT_CONCURRENCY, DatabaseIds, SyncSettings};
use crate::domain::Schema;
use crate::domain::errors::ConfigError;
use crate::ports::{Clock, SystemClock, TableStore};

use super::synchronizer::Synchronizer;
use super::worker_pool::WorkerPool;

/// SyncBuilder は [`Synchronizer`] を構築
///
/// # 使用例
/// ```ignore
/// let sync = SyncBuilder::from_settings(&settings)
///     .store(Arc::new(NotionStore::new(&settings.notion)?))
///     .build()?;
/// let report = sync.run().await?;
/// ```
pub struct SyncBuilder {
    store: Option<Arc<dyn TableStore>>,
    clock: Arc<dyn Clock>,
    ids: Option<DatabaseIds>,
    schema: Schema,
    concurrency: usize,
    page_size: Option<u32>,
}

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no table store was configured")]
    MissingStore,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SyncBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            clock: Arc::new(SystemClock),
            ids: None,
            schema: Schema::default(),
            concurrency: DEFAULT_CONCURRENCY,
            page_size: None,
        }
    }

    /// Take ids, schema and sweep settings from loaded settings.
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self::new()
            .databases(settings.databases.ids())
            .schema(settings.schema.clone())
            .concurrency(settings.sweep.concurrency)
            .page_size(settings.sweep.page_size)
    }

    pub fn store(mut self, store: Arc<dyn TableStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn databases(mut self, ids: DatabaseIds) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Sweep concurrency limit (clamped to at least 1).
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// 検証してから構築
    ///
    /// # Fail-fast 設計
    /// - テーブル ID と store の有無をここで確認する
    /// - 失敗時は store への呼び出しは 1 回も発生しない
    ///
    /// # Errors
    /// - `BuildError::Config(MissingDatabaseId(..))` if a table id is empty or unset
    /// - `BuildError::MissingStore` if no store was given
    pub fn build(self) -> Result<Synchronizer, BuildError> {
        let ids = self
            .ids
            .ok_or(ConfigError::MissingDatabaseId("tasks"))?;
        ids.validate()?;
        let store = self.store.ok_or(BuildError::MissingStore)?;

        Ok(Synchronizer::new(
            store,
            self.clock,
            ids,
            self.schema,
            WorkerPool::new(self.concurrency),
            self.page_size,
        ))
    }
}

impl Default for SyncBuilder {
    fn default() -> Self {
        Self::new()
    }
}

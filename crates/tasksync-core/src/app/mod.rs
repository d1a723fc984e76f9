//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて同期処理そのものを実装します。
//!
//! # 主要コンポーネント
//! - **SyncBuilder**: 構築とワイヤリング（Fail-fast 検証）
//! - **Synchronizer**: フェーズを順に実行
//! - **CompletionSweep**: 完了タスクの並行処理
//! - **ClaimTable** / **WorkerPool**: 実行内の重複排除と並行数の上限
//! - rollup, project_sync, spotlight: 逐次実行される rollup フェーズ

pub mod builder;
pub mod claims;
pub mod pagination;
pub mod project_sync;
pub mod rollup;
pub mod spotlight;
pub mod sweep;
pub mod synchronizer;
pub mod worker_pool;

pub use self::builder::{BuildError, SyncBuilder};
pub use self::claims::{ClaimDecision, ClaimKey, ClaimTable, ClaimTally, Resolution};
pub use self::pagination::fetch_all;
pub use self::rollup::latest_dates;
pub use self::spotlight::{SPOTLIGHT_SIZE, select_spotlight};
pub use self::sweep::CompletionSweep;
pub use self::synchronizer::Synchronizer;
pub use self::worker_pool::WorkerPool;

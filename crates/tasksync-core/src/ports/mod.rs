//! Ports - 抽象化レイヤー
//!
//! システムの境界にある trait 群（リモートのテーブルサービス、時刻、ID 生成）。
//! 実装は `impls` にある。

pub mod clock;
pub mod id_generator;
pub mod table_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::table_store::{QueryPage, QueryRequest, TableStore};
pub use crate::domain::errors::StoreError;

//! ClaimTable - 1 回の sweep 内での作業の重複排除
//!
//! sweep 中に claim されるキーは 2 種類:
//! - レコード ID: 同じ Done レコードを 2 回処理しない
//! - 繰り返しキー: 同じ繰り返しタスクを見た並行ブランチが後続タスクを二重に作らない
//!
//! 規則そのものは純粋関数 [`decide`]（最初の claim が勝ち、以降は負け）。
//! テーブルはアクセスを直列化し、勝ったキーの結末を記録するだけ。
//!
//! # 学習ポイント
//! - 判定（純粋関数）と状態（Mutex）の分離
//! - `tokio::sync::Mutex` による共有状態

use std::collections::HashMap;
use std::fmt;

use tokio::sync::Mutex;

use crate::domain::{RecordId, RecurrenceKey};

/// A claimable unit of sweep work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClaimKey {
    Record(RecordId),
    Recurrence(RecurrenceKey),
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimKey::Record(id) => write!(f, "record:{id}"),
            ClaimKey::Recurrence(key) => write!(f, "recurrence:{key}"),
        }
    }
}

/// What became of a won claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Claimed, work in progress.
    Pending,
    /// A successor task was created.
    Created(RecordId),
    /// The work finished without creating anything.
    Done,
    /// The work failed.
    Failed(String),
}

/// Outcome of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDecision {
    Won,
    Lost,
}

/// First claim wins: a key nobody holds is won, a held key is lost.
pub fn decide(existing: Option<&Resolution>) -> ClaimDecision {
    match existing {
        None => ClaimDecision::Won,
        Some(_) => ClaimDecision::Lost,
    }
}

/// Resolution ごとの件数。sweep の最後にログへ出す。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimTally {
    pub pending: usize,
    pub created: usize,
    pub done: usize,
    pub failed: usize,
}

impl ClaimTally {
    pub fn total(&self) -> usize {
        self.pending + self.created + self.done + self.failed
    }
}

/// 1 回の sweep のワーカー間で共有する claim テーブル
///
/// # 使用例
/// ```ignore
/// let claims = ClaimTable::new();
/// if claims.claim(key.clone()).await == ClaimDecision::Won {
///     claims.resolve(&key, Resolution::Done).await;
/// }
/// ```
///
/// # Thread Safety
/// - Guarded by a `tokio::sync::Mutex`; no await happens while it is held
#[derive(Debug, Default)]
pub struct ClaimTable {
    entries: Mutex<HashMap<ClaimKey, Resolution>>,
}

impl ClaimTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim `key`. A won key is recorded as `Pending`.
    pub async fn claim(&self, key: ClaimKey) -> ClaimDecision {
        let mut entries = self.entries.lock().await;
        let decision = decide(entries.get(&key));
        if decision == ClaimDecision::Won {
            entries.insert(key, Resolution::Pending);
        }
        decision
    }

    /// Record how a won key was resolved. Unclaimed keys are ignored.
    pub async fn resolve(&self, key: &ClaimKey, resolution: Resolution) {
        if let Some(entry) = self.entries.lock().await.get_mut(key) {
            *entry = resolution;
        }
    }

    /// Count claimed keys by resolution.
    pub async fn tally(&self) -> ClaimTally {
        let entries = self.entries.lock().await;
        let mut tally = ClaimTally::default();
        for resolution in entries.values() {
            match resolution {
                Resolution::Pending => tally.pending += 1,
                Resolution::Created(_) => tally.created += 1,
                Resolution::Done => tally.done += 1,
                Resolution::Failed(_) => tally.failed += 1,
            }
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recurrence(title: &str) -> ClaimKey {
        ClaimKey::Recurrence(RecurrenceKey {
            title: title.into(),
            project: Some("Home".into()),
            cyclic: Some("Weekly".into()),
        })
    }

    #[test]
    fn decide_is_first_claim_wins() {
        assert_eq!(decide(None), ClaimDecision::Won);
        assert_eq!(decide(Some(&Resolution::Pending)), ClaimDecision::Lost);
        assert_eq!(decide(Some(&Resolution::Failed("x".into()))), ClaimDecision::Lost);
    }

    #[tokio::test]
    async fn second_claim_loses() {
        let table = ClaimTable::new();
        assert_eq!(table.claim(recurrence("a")).await, ClaimDecision::Won);
        assert_eq!(table.claim(recurrence("a")).await, ClaimDecision::Lost);
        assert_eq!(table.claim(recurrence("b")).await, ClaimDecision::Won);
        assert_eq!(table.tally().await.total(), 2);
    }

    #[tokio::test]
    async fn record_and_recurrence_keys_do_not_collide() {
        let table = ClaimTable::new();
        let record = ClaimKey::Record(RecordId::new("a"));
        assert_eq!(table.claim(record).await, ClaimDecision::Won);
        assert_eq!(table.claim(recurrence("a")).await, ClaimDecision::Won);
    }

    #[tokio::test]
    async fn resolve_updates_only_claimed_keys() {
        let table = ClaimTable::new();
        let key = recurrence("a");
        table.claim(key.clone()).await;
        table
            .resolve(&key, Resolution::Created(RecordId::new("new")))
            .await;
        table.resolve(&recurrence("b"), Resolution::Done).await;

        let tally = table.tally().await;
        assert_eq!(tally.created, 1);
        assert_eq!(tally.done, 0);
        assert_eq!(tally.total(), 1);
    }

    #[tokio::test]
    async fn tally_counts_each_resolution() {
        let table = ClaimTable::new();
        for (title, resolution) in [
            ("a", Some(Resolution::Created(RecordId::new("n1")))),
            ("b", Some(Resolution::Done)),
            ("c", Some(Resolution::Failed("boom".into()))),
            ("d", None),
        ] {
            table.claim(recurrence(title)).await;
            if let Some(resolution) = resolution {
                table.resolve(&recurrence(title), resolution).await;
            }
        }

        assert_eq!(
            table.tally().await,
            ClaimTally {
                pending: 1,
                created: 1,
                done: 1,
                failed: 1,
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_have_one_winner() {
        let table = Arc::new(ClaimTable::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let table = Arc::clone(&table);
            handles.push(tokio::spawn(async move { table.claim(recurrence("x")).await }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() == ClaimDecision::Won {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[test]
    fn keys_display_their_kind() {
        assert_eq!(ClaimKey::Record(RecordId::new("r1")).to_string(), "record:r1");
        assert_eq!(recurrence("a").to_string(), "recurrence:a-Home-Weekly");
    }
}

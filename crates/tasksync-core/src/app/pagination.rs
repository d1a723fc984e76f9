//! Pagination - フィルタ付きクエリを全ページ分取得
//!
//! カーソルプロトコルを扱うのはここだけ。結果はすべてメモリに集める。

use tracing::debug;

use crate::domain::errors::StoreError;
use crate::domain::{DatabaseId, Filter, Record};
use crate::ports::{QueryRequest, TableStore};

/// Fetch every non-archived record of `database` matching `filter`.
///
/// # Errors
/// - any query error, as is
/// - `StoreError::StuckCursor` when a page hands back the cursor it was asked for
pub async fn fetch_all(
    store: &dyn TableStore,
    database: &DatabaseId,
    filter: Option<Filter>,
    page_size: Option<u32>,
) -> Result<Vec<Record>, StoreError> {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let request = QueryRequest {
            filter: filter.clone(),
            start_cursor: cursor.clone(),
            page_size,
        };
        let page = store.query(database, request).await?;
        pages += 1;
        records.extend(page.records);

        match page.next_cursor {
            None => break,
            Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                return Err(StoreError::StuckCursor(next));
            }
            Some(next) => cursor = Some(next),
        }
    }

    debug!(%database, pages, count = records.len(), "fetched all records");
    Ok(records)
}

//! TableStore port - the remote structured-table service.
//!
//! Every table the sync touches (tasks, projects, spotlight) is reached
//! through this trait. The service itself is an external collaborator; this
//! crate ships an HTTP adapter and an in-memory one (see `impls`).

use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::{DatabaseId, Filter, Properties, Record, RecordId};

/// One query call: optional filter plus paging parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub filter: Option<Filter>,
    pub start_cursor: Option<String>,
    pub page_size: Option<u32>,
}

impl QueryRequest {
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub records: Vec<Record>,

    /// Opaque cursor of the next page; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// The remote table service.
///
/// # Thread Safety
/// - `Send + Sync` is required: sweep workers share one store.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Create a record in `database`, returning its id.
    async fn create(
        &self,
        database: &DatabaseId,
        properties: Properties,
    ) -> Result<RecordId, StoreError>;

    /// Fetch one page of non-archived records matching the request.
    async fn query(
        &self,
        database: &DatabaseId,
        request: QueryRequest,
    ) -> Result<QueryPage, StoreError>;

    /// Fetch a single record by id.
    async fn retrieve(&self, id: &RecordId) -> Result<Record, StoreError>;

    /// Overwrite the given properties, leaving the others untouched.
    async fn update(&self, id: &RecordId, properties: Properties) -> Result<Record, StoreError>;

    /// Soft-delete a record.
    async fn archive(&self, id: &RecordId) -> Result<Record, StoreError>;
}

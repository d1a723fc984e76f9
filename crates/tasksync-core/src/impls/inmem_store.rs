//! InMemoryTableStore - an in-process table service for tests and dry runs.
//!
//! # Behaviour
//! - Tables are keyed by database id and keep insertion order
//! - Queries skip archived records and page with an offset cursor
//! - Every port call is counted; failures can be injected per operation

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::StoreError;
use crate::domain::{DatabaseId, Properties, Record, RecordId};
use crate::ports::{IdGenerator, QueryPage, QueryRequest, SystemClock, TableStore, UlidGenerator};

/// Default and maximum page size, as on the real service.
pub const MAX_PAGE_SIZE: usize = 100;

/// Port operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Query,
    Retrieve,
    Update,
    Archive,
}

/// Number of port calls received, by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create: usize,
    pub query: usize,
    pub retrieve: usize,
    pub update: usize,
    pub archive: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.create + self.query + self.retrieve + self.update + self.archive
    }

    fn bump(&mut self, op: StoreOp) {
        match op {
            StoreOp::Create => self.create += 1,
            StoreOp::Query => self.query += 1,
            StoreOp::Retrieve => self.retrieve += 1,
            StoreOp::Update => self.update += 1,
            StoreOp::Archive => self.archive += 1,
        }
    }
}

/// A failure rule: every call of `op` (on `record`, when given) fails.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InjectedFailure {
    op: StoreOp,
    record: Option<RecordId>,
}

#[derive(Default)]
struct StoreState {
    /// Table -> record ids in insertion order.
    tables: HashMap<DatabaseId, Vec<RecordId>>,

    /// All records (single source of truth).
    records: HashMap<RecordId, Record>,

    failures: Vec<InjectedFailure>,
    calls: CallCounts,
}

impl StoreState {
    /// Count the call and apply failure rules.
    fn enter(&mut self, op: StoreOp, record: Option<&RecordId>) -> Result<(), StoreError> {
        self.calls.bump(op);
        let hit = self.failures.iter().any(|f| {
            f.op == op && (f.record.is_none() || f.record.as_ref() == record)
        });
        if hit {
            let target = record.map(|r| format!(" on {r}")).unwrap_or_default();
            return Err(StoreError::Injected(format!("{op:?}{target}")));
        }
        Ok(())
    }

    fn table(&self, database: &DatabaseId) -> Result<&Vec<RecordId>, StoreError> {
        self.tables
            .get(database)
            .ok_or_else(|| StoreError::UnknownTable(database.clone()))
    }

    fn insert(&mut self, database: &DatabaseId, id: RecordId, properties: Properties) -> Result<(), StoreError> {
        let table = self
            .tables
            .get_mut(database)
            .ok_or_else(|| StoreError::UnknownTable(database.clone()))?;
        table.push(id.clone());
        self.records.insert(id.clone(), Record::new(id, properties));
        Ok(())
    }

    fn live_record_mut(&mut self, id: &RecordId) -> Result<&mut Record, StoreError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if record.archived {
            return Err(StoreError::Api {
                status: 400,
                code: "validation_error".into(),
                message: format!("can't edit archived record {id}"),
            });
        }
        Ok(record)
    }
}

/// In-memory table service.
pub struct InMemoryTableStore {
    state: Mutex<StoreState>,
    ids: Box<dyn IdGenerator>,
    page_size: usize,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            ids: Box::new(UlidGenerator::new(SystemClock)),
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Register an empty table.
    pub fn with_table(mut self, database: impl Into<DatabaseId>) -> Self {
        self.state
            .get_mut()
            .tables
            .entry(database.into())
            .or_default();
        self
    }

    /// Page size used when a query doesn't ask for one (clamped to 1..=100).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Insert a record directly (not counted as a port call).
    pub async fn seed(
        &self,
        database: &DatabaseId,
        properties: Properties,
    ) -> Result<RecordId, StoreError> {
        let id = self.ids.generate_record_id();
        let mut state = self.state.lock().await;
        state.insert(database, id.clone(), properties)?;
        Ok(id)
    }

    /// Make every future `op` call fail (only for `record`, when given).
    pub async fn inject_failure(&self, op: StoreOp, record: Option<RecordId>) {
        let mut state = self.state.lock().await;
        state.failures.push(InjectedFailure { op, record });
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    pub async fn calls(&self) -> CallCounts {
        self.state.lock().await.calls
    }

    /// Every record of a table, archived ones included, in insertion order.
    pub async fn all_records(&self, database: &DatabaseId) -> Vec<Record> {
        let state = self.state.lock().await;
        state
            .tables
            .get(database)
            .map(|ids| ids.iter().filter_map(|id| state.records.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    /// Non-archived records of a table, in insertion order.
    pub async fn live_records(&self, database: &DatabaseId) -> Vec<Record> {
        self.all_records(database)
            .await
            .into_iter()
            .filter(|r| !r.archived)
            .collect()
    }
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_cursor(cursor: &str) -> Result<usize, StoreError> {
    cursor.parse().map_err(|_| StoreError::Api {
        status: 400,
        code: "validation_error".into(),
        message: format!("invalid start_cursor {cursor:?}"),
    })
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn create(
        &self,
        database: &DatabaseId,
        properties: Properties,
    ) -> Result<RecordId, StoreError> {
        tokio::task::yield_now().await;
        let id = self.ids.generate_record_id();
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Create, None)?;
        state.insert(database, id.clone(), properties)?;
        Ok(id)
    }

    async fn query(
        &self,
        database: &DatabaseId,
        request: QueryRequest,
    ) -> Result<QueryPage, StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Query, None)?;

        let matching: Vec<Record> = state
            .table(database)?
            .iter()
            .filter_map(|id| state.records.get(id))
            .filter(|r| !r.archived)
            .filter(|r| request.filter.as_ref().is_none_or(|f| f.matches(r)))
            .cloned()
            .collect();

        let offset = match request.start_cursor.as_deref() {
            Some(cursor) => parse_cursor(cursor)?,
            None => 0,
        };
        let page_size = request
            .page_size
            .map(|n| (n as usize).clamp(1, MAX_PAGE_SIZE))
            .unwrap_or(self.page_size);

        let end = offset.saturating_add(page_size).min(matching.len());
        let records = matching.get(offset..end).map(<[Record]>::to_vec).unwrap_or_default();
        let next_cursor = (end < matching.len()).then(|| end.to_string());

        Ok(QueryPage {
            records,
            next_cursor,
        })
    }

    async fn retrieve(&self, id: &RecordId) -> Result<Record, StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Retrieve, Some(id))?;
        state
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update(&self, id: &RecordId, properties: Properties) -> Result<Record, StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Update, Some(id))?;
        let record = state.live_record_mut(id)?;
        record.properties.extend(properties);
        Ok(record.clone())
    }

    async fn archive(&self, id: &RecordId) -> Result<Record, StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Archive, Some(id))?;
        let record = state.live_record_mut(id)?;
        record.archived = true;
        Ok(record.clone())
    }
}

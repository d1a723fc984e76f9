//! Domain model (IDs, records, filters, schemas, outcomes, ...).
//!
//! Nothing in here talks to the network; everything is plain data plus the
//! pure rules that interpret it.

pub mod date;
pub mod errors;
pub mod filter;
pub mod ids;
pub mod outcome;
pub mod project;
pub mod record;
pub mod schema;
pub mod task;

pub use self::date::{LatestDates, StoredDate, format_timestamp, parse_timestamp};
pub use self::errors::{ConfigError, ErrorKind, StoreError, SyncError};
pub use self::filter::Filter;
pub use self::ids::{DatabaseId, RecordId};
pub use self::outcome::{
    OutcomeCounts, OutcomeKind, PhaseReport, RunReport, StepKind, StepOutcome, StepRecord,
};
pub use self::project::{ProjectRollup, SpotlightEntry};
pub use self::record::{Properties, PropertyValue, Record};
pub use self::schema::{ProjectSchema, Schema, SpotlightSchema, TaskSchema};
pub use self::task::{RecurrenceKey, TaskFields, TaskStatus};

//! IdGenerator port - ID generation for locally created records.
//!
//! The remote service assigns its own ids; this is only used by the
//! in-memory store, which has to mint ids itself.
//!
//! # Implementation
//! - **UlidGenerator**: ULID based, timestamp taken from a `Clock`

use crate::domain::ids::RecordId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator mints record ids.
///
/// # Thread Safety
/// - `Send + Sync` is required (shared by concurrent workers)
pub trait IdGenerator: Send + Sync {
    fn generate_record_id(&self) -> RecordId;
}

/// UlidGenerator builds ULIDs from the clock's current time plus randomness,
/// so a `FixedClock` gives a deterministic timestamp prefix.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_record_id(&self) -> RecordId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        RecordId::from(ulid)
    }
}

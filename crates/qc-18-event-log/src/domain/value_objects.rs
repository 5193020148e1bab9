//! # Value Objects
//!
//! Constants that fix the on-ledger layout and acceptance policy of the event log.

use std::time::Duration;

use shared_types::ObjectId;

/// Name under which the event-log contract is registered with the ledger.
pub const CONTRACT_NAME: &str = "eventlog";

/// Name of the spawn argument carrying the encoded event.
pub const EVENT_ARGUMENT: &str = "event";

/// Labels used to derive the ids of objects created by one instruction.
pub mod labels {
    pub const EVENT: &str = "event";
    pub const BUCKET: &str = "bucket";
    pub const SENTINEL: &str = "catch-all";
}

/// Ledger key of the head pointer.
///
/// Fixed per ledger instance; all other keys are SHA-256 derived, so this
/// readable key never collides with them in practice.
pub const HEAD_POINTER_KEY: ObjectId = ObjectId(*b"qc-18/event-log/head-pointer\0\0\0\0");

/// How far in the past an event's timestamp may lie when it is validated.
///
/// Bounds clock and ordering skew introduced by block production.
pub const TIMESTAMP_TOLERANCE: Duration = Duration::from_secs(5);

/// Age (relative to the head bucket's start) past which a new head is created.
pub const DEFAULT_BUCKET_MAX_AGE: Duration = Duration::from_secs(5);

/// Default cap on the number of events returned by one search.
pub const DEFAULT_SEARCH_MAX: usize = 10_000;

/// Default block interval for new ledger instances.
pub const DEFAULT_BLOCK_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound on an encoded event, rejects absurd length prefixes in contract input.
pub const MAX_RECORD_SIZE: u64 = 16 * 1024 * 1024;

/// Convert a duration to signed nanoseconds, saturating at `i64::MAX`.
pub fn duration_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

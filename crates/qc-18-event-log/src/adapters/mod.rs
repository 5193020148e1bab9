//! # Adapters Layer
//!
//! Secondary adapters for the qc-18 Event Log subsystem.
//! These implement the hexagonal architecture pattern.

pub mod clock;
pub mod ledger_store;
pub mod memory_ledger;

pub use clock::{ManualClock, SystemClock};
pub use ledger_store::LedgerBucketStore;
pub use memory_ledger::{InMemoryLedger, MemoryView};

//! # QC-18 Event Log - Verifiable Time-Searchable Log
//!
//! **Subsystem ID:** 18
//!
//! ## Purpose
//!
//! Append-oriented log of timestamped, topic-tagged events stored in the state
//! of a consensus ledger instance. Every stored event can be proven with the
//! ledger's inclusion proofs; a secondary bucket-chain index makes the log
//! searchable by time range and topic.
//!
//! ## Bucket Chain
//!
//! ```text
//!  head pointer ──► [ head, start=t3 ] ──► [ start=t2 ] ──► [ start=t1 ] ──► [ sentinel, start=0 ]
//!                      │ events            │ events          │ events          │ late events
//! ```
//!
//! - Buckets link newest to oldest through `prev`; the sentinel ends the chain.
//! - A new head opens only when an incoming event is more than
//!   `bucket_max_age` newer than the current head's start.
//! - Late events walk back and join the newest bucket that starts at or
//!   before them.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Exactly one sentinel, at the end of the chain | `index/bootstrap.rs` |
//! | Bucket starts never decrease towards the head | `index/writer.rs`, checked in `index/chain.rs` |
//! | Every event is referenced by exactly one bucket | `index/writer.rs` |
//! | `now - 5s <= when <= now` at validation | `domain/codec.rs` - `validate_timestamp()` |
//! | Dangling references are fatal | `adapters/ledger_store.rs` |
//!
//! ## Hexagonal Architecture
//!
//! | Layer | Contents |
//! |-------|----------|
//! | `domain` | Event, Bucket, queries, codec, errors |
//! | `index` | Bucket-chain writer, reader and pager |
//! | `ports` | `EventLogApi` (inbound); `Ledger`, `BucketStore`, `TimeSource` (outbound) |
//! | `adapters` | Ledger-backed bucket store, in-memory ledger, clocks |
//! | `contract` | The event-log contract executed by the ledger |
//! | `service` | `EventLogService`, the `EventLogApi` implementation |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_18_event_log::prelude::*;
//!
//! let service = EventLogService::new(ledger, clock, EventLogConfig::from_env())?;
//! let log = service.init(InitRequest { roster, owner, block_interval }).await?.id;
//!
//! let key = service.log_event(log, &Event::new("login", b"alice".to_vec())).await?;
//! let hits = service.search(SearchRequest { instance_id: log, topic: "login".into(), ..Default::default() }).await?;
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod contract;
pub mod domain;
pub mod index;
pub mod ipc;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::{InMemoryLedger, LedgerBucketStore, ManualClock, SystemClock};
    pub use crate::config::{ConfigError, EventLogConfig};
    pub use crate::contract::EventLogContract;
    pub use crate::domain::{Bucket, Event, EventLogError, IndexedEvent, SearchQuery, SearchResult};
    pub use crate::index::{BucketChainReader, BucketChainWriter, Placement, SearchPager};
    pub use crate::ipc::{
        GetEventRequest, GetEventResponse, InitRequest, InitResponse, LogRequest, LogResponse,
        SearchRequest, SearchResponse,
    };
    pub use crate::ports::{BucketStore, EventLogApi, Ledger, TimeSource};
    pub use crate::service::EventLogService;
}

pub use config::EventLogConfig;
pub use domain::{Event, EventLogError};
pub use service::EventLogService;

//! # Request/Response Payloads
//!
//! Messages exchanged at the Event Log service boundary.
//!
//! Transport and marshaling happen elsewhere; these types only fix the shape
//! of each request and response.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{InstanceId, ObjectId, Roster, Transaction};

use crate::domain::{Event, IndexedEvent, SearchQuery};

// ============================================================
// INIT
// ============================================================

/// Request to create a new event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRequest {
    /// Nodes that will maintain the log's ledger instance.
    pub roster: Roster,
    /// Owner policy; events are accepted from the signers it names.
    pub owner: Vec<u8>,
    /// Block interval; zero selects the configured default.
    pub block_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    /// Id of the new ledger instance.
    pub id: InstanceId,
}

// ============================================================
// LOG
// ============================================================

/// Request to submit a transaction carrying an encoded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRequest {
    pub instance_id: InstanceId,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogResponse {}

// ============================================================
// GET EVENT
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEventRequest {
    pub instance_id: InstanceId,
    /// Ledger key of the event.
    pub key: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEventResponse {
    pub event: Event,
}

// ============================================================
// SEARCH
// ============================================================

/// Search the log for events in `[from, to)` with an optional topic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub instance_id: InstanceId,
    /// Inclusive lower bound (ns).
    pub from: i64,
    /// Exclusive upper bound (ns); zero means "now".
    pub to: i64,
    /// Exact topic to match; empty matches all topics.
    pub topic: String,
}

impl SearchRequest {
    /// The time-range/topic part of the request.
    pub fn query(&self) -> SearchQuery {
        SearchQuery {
            from: self.from,
            to: self.to,
            topic: (!self.topic.is_empty()).then(|| self.topic.clone()),
        }
    }
}

/// Matching events, oldest first.
///
/// When `truncated` is set, the newest matches were dropped; re-issue the
/// search with `from` set to the last event's `when` to continue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub events: Vec<IndexedEvent>,
    pub truncated: bool,
}

//! # Domain Entities
//!
//! Records stored in ledger state by the event log, plus the search types.
//!
//! ## Layout in Ledger State
//!
//! ```text
//! HEAD_POINTER_KEY ──→ head bucket ──prev──→ bucket ──prev──→ ... ──prev──→ sentinel
//!                          │                   │                              │
//!                      event_refs          event_refs                     event_refs
//!                          ↓                   ↓                              ↓
//!                       events              events                         events
//! ```
//!
//! Every arrow is an [`ObjectId`] key into the ledger's key/value state; nothing
//! here holds in-process references to other records.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use shared_types::ObjectId;

use super::value_objects::duration_nanos;

/// A timestamped, topic-tagged, opaque-payload record submitted to the log.
///
/// Immutable once accepted: created exactly once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Nanoseconds since the Unix epoch.
    pub when: i64,
    /// Exact-match filter key.
    pub topic: String,
    /// Opaque payload.
    pub content: Vec<u8>,
}

impl Event {
    /// Create an event stamped with the current wall-clock time.
    pub fn new(topic: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let when = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(duration_nanos)
            .unwrap_or_default();
        Self::at(when, topic, content)
    }

    /// Create an event with an explicit timestamp.
    pub fn at(when: i64, topic: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            when,
            topic: topic.into(),
            content: content.into(),
        }
    }
}

/// A time-window container of event references, linked to its predecessor.
///
/// ## Lifecycle
///
/// - Created once, either as the sentinel or as a new head.
/// - Appended to while it is the head and no older than the configured maximum age,
///   or when a late event's backward walk stops on it.
/// - Never mutated again after a newer head supersedes it and no late event maps
///   into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Minimum timestamp this bucket is responsible for (inclusive).
    pub start: i64,
    /// Chronologically preceding bucket, `None` only for the sentinel.
    pub prev: Option<ObjectId>,
    /// Event addresses in arrival order.
    pub event_refs: Vec<ObjectId>,
}

impl Bucket {
    /// The catch-all bucket terminating every chain.
    pub fn sentinel() -> Self {
        Self {
            start: 0,
            prev: None,
            event_refs: Vec::new(),
        }
    }

    /// A new head bucket opened by the event stored at `first_event`.
    pub fn new_head(start: i64, prev: ObjectId, first_event: ObjectId) -> Self {
        Self {
            start,
            prev: Some(prev),
            event_refs: vec![first_event],
        }
    }

    /// True for the sentinel (the only bucket without a predecessor).
    pub fn is_sentinel(&self) -> bool {
        self.prev.is_none()
    }
}

/// An event returned by a search together with its ledger key.
///
/// The key lets a caller fetch an inclusion proof for any hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEvent {
    pub id: ObjectId,
    pub event: Event,
}

/// A time-range / topic query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Inclusive lower bound (ns).
    pub from: i64,
    /// Exclusive upper bound (ns); zero means "now".
    pub to: i64,
    /// Exact topic to match; `None` matches every topic.
    pub topic: Option<String>,
}

impl SearchQuery {
    pub fn new(from: i64, to: i64) -> Self {
        Self {
            from,
            to,
            topic: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Whether `event` falls inside `[from, to)` and matches the topic filter.
    ///
    /// `to` must already be resolved (non-zero).
    pub fn matches(&self, event: &Event, to: i64) -> bool {
        if event.when < self.from || event.when >= to {
            return false;
        }
        match &self.topic {
            Some(topic) => *topic == event.topic,
            None => true,
        }
    }
}

/// Outcome of a search: matches oldest first, plus whether the cap was hit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub events: Vec<IndexedEvent>,
    pub truncated: bool,
}

impl SearchResult {
    /// The newest event returned, the resume point for the next page.
    pub fn last(&self) -> Option<&IndexedEvent> {
        self.events.last()
    }
}

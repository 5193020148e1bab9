//! # Bucket Chain Reader
//!
//! Answers time-range / topic queries by walking the chain from the head
//! towards the sentinel, collecting the buckets whose time span can overlap
//! `[from, to)`, and then emitting their matching events oldest bucket first.
//!
//! A bucket spans from its own start up to the start of its successor (the head
//! spans up to `now`). The walk stops as soon as a bucket ends before `from`.
//!
//! Buckets partition time, so sorting each bucket's matches by timestamp makes
//! the whole result time-ordered even when events arrived out of order.

use shared_types::ObjectId;
use tracing::{debug, error};

use super::chain::ChainCursor;
use crate::domain::{Bucket, EventLogError, IndexedEvent, SearchQuery, SearchResult};
use crate::ports::BucketStore;

/// Executes searches over the bucket chain with a fixed result cap.
#[derive(Debug, Clone, Copy)]
pub struct BucketChainReader {
    search_max: usize,
}

impl BucketChainReader {
    /// A cap of zero is raised to one.
    pub fn new(search_max: usize) -> Self {
        Self {
            search_max: search_max.max(1),
        }
    }

    /// Run `query`, with `to == 0` meaning `now`.
    pub fn search<S: BucketStore>(
        &self,
        store: &S,
        query: &SearchQuery,
        now: i64,
    ) -> Result<SearchResult, EventLogError> {
        self.search_with_limit(store, query, now, self.search_max)
    }

    /// Like [`search`](Self::search) but with an explicit result cap.
    pub fn search_with_limit<S: BucketStore>(
        &self,
        store: &S,
        query: &SearchQuery,
        now: i64,
        limit: usize,
    ) -> Result<SearchResult, EventLogError> {
        let limit = limit.max(1);
        let to = if query.to == 0 { now } else { query.to };

        let overlapping = collect_overlapping(store, query.from, to, now)?;
        debug!(
            from = query.from,
            to,
            buckets = overlapping.len(),
            "Searching bucket chain"
        );

        let mut result = SearchResult::default();
        'buckets: for (bucket_id, bucket) in overlapping.iter().rev() {
            let mut hits = Vec::new();
            for event_id in &bucket.event_refs {
                let event = store.get_event(event_id).map_err(|e| {
                    error!(bucket = %bucket_id, event = %event_id, "Unreadable event in bucket");
                    e
                })?;
                if query.matches(&event, to) {
                    hits.push(IndexedEvent {
                        id: *event_id,
                        event,
                    });
                }
            }
            // Stored order is arrival order, so the cap can only be applied
            // once every event of the bucket has been read and sorted.
            hits.sort_by_key(|hit| hit.event.when);

            for hit in hits {
                result.events.push(hit);
                if result.events.len() >= limit {
                    result.truncated = true;
                    break 'buckets;
                }
            }
        }
        Ok(result)
    }
}

/// Buckets that may hold events in `[from, to)`, newest first.
fn collect_overlapping<S: BucketStore>(
    store: &S,
    from: i64,
    to: i64,
    now: i64,
) -> Result<Vec<(ObjectId, Bucket)>, EventLogError> {
    let mut overlapping = Vec::new();
    let Some((head_id, head)) = store.get_head()? else {
        return Ok(overlapping);
    };
    if from > now {
        return Ok(overlapping);
    }

    let mut cursor = ChainCursor::new(store, head_id);
    let mut current = (head_id, head);
    loop {
        let (id, bucket) = current;
        // The predecessor ends where this bucket starts.
        let done = bucket.is_sentinel() || from > bucket.start;
        let next = if done { None } else { cursor.prev(&bucket)? };
        if to >= bucket.start {
            overlapping.push((id, bucket));
        }
        match next {
            Some(prev) => current = prev,
            None => break,
        }
    }
    Ok(overlapping)
}

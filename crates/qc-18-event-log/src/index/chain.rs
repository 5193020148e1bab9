//! Iterative backward walk over the bucket chain.

use std::collections::HashSet;

use shared_types::ObjectId;
use tracing::error;

use crate::domain::{Bucket, EventLogError};
use crate::ports::BucketStore;

/// Follows `prev` links from a starting bucket towards the sentinel.
///
/// Each step checks the chain invariants it can see: no bucket is visited
/// twice, and a non-sentinel predecessor never starts after its successor.
pub(crate) struct ChainCursor<'s, S> {
    store: &'s S,
    visited: HashSet<ObjectId>,
}

impl<'s, S: BucketStore> ChainCursor<'s, S> {
    pub(crate) fn new(store: &'s S, start: ObjectId) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start);
        Self { store, visited }
    }

    /// Load the predecessor of `current`, `None` once `current` is the sentinel.
    pub(crate) fn prev(
        &mut self,
        current: &Bucket,
    ) -> Result<Option<(ObjectId, Bucket)>, EventLogError> {
        let Some(prev_id) = current.prev else {
            return Ok(None);
        };
        if !self.visited.insert(prev_id) {
            error!(bucket = %prev_id, "Cycle in bucket chain");
            return Err(EventLogError::corrupt(prev_id, "cycle in bucket chain"));
        }
        let prev = self.store.get_bucket(&prev_id)?;
        if !prev.is_sentinel() && prev.start > current.start {
            error!(bucket = %prev_id, start = prev.start, successor_start = current.start, "Bucket chain out of order");
            return Err(EventLogError::corrupt(
                prev_id,
                format!(
                    "bucket start {} after successor start {}",
                    prev.start, current.start
                ),
            ));
        }
        Ok(Some((prev_id, prev)))
    }
}

//! # Bucket Chain Writer
//!
//! Places one validated event into the bucket chain and produces the state
//! changes that record it.
//!
//! ## Placement
//!
//! Starting at the head, walk `prev` links while the bucket starts after the
//! event, stopping at the sentinel. The event joins the bucket the walk stops
//! at, unless that bucket is still the head and has grown older than
//! `bucket_max_age`, in which case a new head opens at the event's timestamp.
//!
//! Late events therefore land in an older bucket (possibly the sentinel) and
//! never open a new head.

use std::time::Duration;

use shared_types::{Instruction, ObjectId, StateAction, StateChange};
use tracing::debug;

use super::bootstrap::bootstrap_changes;
use super::chain::ChainCursor;
use crate::adapters::ledger_store::{bucket_created, bucket_updated, event_created, head_pointer_set};
use crate::domain::{duration_nanos, labels, Bucket, Event, EventLogError};
use crate::ports::BucketStore;

/// Ids of every object one insertion may create, derived from the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewObjectIds {
    pub event: ObjectId,
    pub bucket: ObjectId,
    pub sentinel: ObjectId,
}

impl NewObjectIds {
    pub fn derive(instruction: &Instruction) -> Self {
        Self {
            event: instruction.derive_id(labels::EVENT),
            bucket: instruction.derive_id(labels::BUCKET),
            sentinel: instruction.derive_id(labels::SENTINEL),
        }
    }
}

/// Where an incoming event goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The log is empty: create the sentinel and a first head.
    Bootstrap,
    /// The head is too old: open a new head linked to `prev`.
    NewHead { prev: ObjectId },
    /// Append to an existing bucket.
    Append { id: ObjectId, bucket: Bucket },
}

/// Inserts events into the bucket chain.
#[derive(Debug, Clone, Copy)]
pub struct BucketChainWriter {
    bucket_max_age_ns: i64,
}

impl BucketChainWriter {
    pub fn new(bucket_max_age: Duration) -> Self {
        Self {
            bucket_max_age_ns: duration_nanos(bucket_max_age),
        }
    }

    /// Decide where `event` belongs without producing any changes.
    pub fn place<S: BucketStore>(
        &self,
        store: &S,
        event: &Event,
    ) -> Result<Placement, EventLogError> {
        let Some((head_id, head)) = store.get_head()? else {
            return Ok(Placement::Bootstrap);
        };

        let mut cursor = ChainCursor::new(store, head_id);
        let (mut id, mut bucket) = (head_id, head);
        let mut is_head = true;
        while bucket.start > event.when {
            match cursor.prev(&bucket)? {
                Some((prev_id, prev)) => {
                    id = prev_id;
                    bucket = prev;
                    is_head = false;
                }
                None => break,
            }
        }

        if is_head && event.when.saturating_sub(bucket.start) > self.bucket_max_age_ns {
            Ok(Placement::NewHead { prev: id })
        } else {
            Ok(Placement::Append { id, bucket })
        }
    }

    /// State changes that store `event` and index it.
    ///
    /// The event record always comes first. `encoded` is stored verbatim.
    pub fn insert<S: BucketStore>(
        &self,
        store: &S,
        event: &Event,
        encoded: Vec<u8>,
        ids: &NewObjectIds,
    ) -> Result<Vec<StateChange>, EventLogError> {
        let placement = self.place(store, event)?;
        debug!(event = %ids.event, when = event.when, placement = ?placement, "Placing event");

        let mut changes = vec![event_created(ids.event, encoded)];
        match placement {
            Placement::Bootstrap => changes.extend(bootstrap_changes(event, ids)?),
            Placement::NewHead { prev } => {
                let head = Bucket::new_head(event.when, prev, ids.event);
                changes.push(bucket_created(ids.bucket, &head)?);
                changes.push(head_pointer_set(StateAction::Update, &ids.bucket)?);
            }
            Placement::Append { id, mut bucket } => {
                bucket.event_refs.push(ids.event);
                changes.push(bucket_updated(id, &bucket)?);
            }
        }
        Ok(changes)
    }
}

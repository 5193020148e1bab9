//! # Index Bootstrap
//!
//! First write into an empty log. Before any time-bucketed bucket exists, the
//! chain gets its catch-all sentinel (`start = 0`, no `prev`), so that events
//! arriving later with a timestamp before the first head still have a bucket
//! whose start they satisfy.

use shared_types::{StateAction, StateChange};

use super::writer::NewObjectIds;
use crate::adapters::ledger_store::{bucket_created, head_pointer_set};
use crate::domain::{Bucket, Event, EventLogError};

/// State changes that create the sentinel, the first head and the head pointer.
///
/// The first head starts at the event's timestamp and holds only that event.
pub fn bootstrap_changes(
    event: &Event,
    ids: &NewObjectIds,
) -> Result<Vec<StateChange>, EventLogError> {
    let head = Bucket::new_head(event.when, ids.sentinel, ids.event);
    Ok(vec![
        bucket_created(ids.sentinel, &Bucket::sentinel())?,
        bucket_created(ids.bucket, &head)?,
        head_pointer_set(StateAction::Create, &ids.bucket)?,
    ])
}

//! # Ledger Bucket Store
//!
//! Adapter from a ledger [`StateView`] to the typed [`BucketStore`] port, plus
//! the builders for the state changes that write bucket-chain records.
//!
//! ## Fatality Policy
//!
//! A reference that does not resolve, or that resolves to a record owned by
//! another contract, means the chain invariants are broken for this ledger
//! instance. Such reads fail with `CorruptChain` and are never papered over.

use shared_types::{ObjectId, StateAction, StateChange, StateView};
use tracing::error;

use crate::domain::{
    decode_bucket, decode_event, decode_head_pointer, encode_bucket, encode_head_pointer, Bucket,
    Event, EventLogError, CONTRACT_NAME, HEAD_POINTER_KEY,
};
use crate::ports::BucketStore;

/// Reads bucket-chain records from one ledger state snapshot.
pub struct LedgerBucketStore<V> {
    view: V,
}

impl<V: StateView> LedgerBucketStore<V> {
    pub fn new(view: V) -> Self {
        Self { view }
    }

    /// Raw value at `key` if present and owned by the event-log contract.
    fn read(&self, key: &ObjectId) -> Result<Option<Vec<u8>>, EventLogError> {
        let Some(record) = self.view.get(key)? else {
            return Ok(None);
        };
        if record.contract_id != CONTRACT_NAME {
            error!(key = %key, owner = %record.contract_id, "Event-log key owned by another contract");
            return Err(EventLogError::corrupt(
                *key,
                format!("record owned by contract {}", record.contract_id),
            ));
        }
        Ok(Some(record.value))
    }

    fn read_existing(&self, key: &ObjectId, what: &str) -> Result<Vec<u8>, EventLogError> {
        match self.read(key)? {
            Some(value) => Ok(value),
            None => {
                error!(key = %key, "Expected event-log {} not found", what);
                Err(EventLogError::corrupt(*key, format!("{what} not found")))
            }
        }
    }
}

impl<V: StateView> BucketStore for LedgerBucketStore<V> {
    fn get_head(&self) -> Result<Option<(ObjectId, Bucket)>, EventLogError> {
        let Some(pointer) = self.read(&HEAD_POINTER_KEY)? else {
            return Ok(None);
        };
        let head_id = decode_head_pointer(&pointer)?;
        let head = self.get_bucket(&head_id)?;
        Ok(Some((head_id, head)))
    }

    fn get_bucket(&self, id: &ObjectId) -> Result<Bucket, EventLogError> {
        let value = self.read_existing(id, "bucket")?;
        decode_bucket(&value)
    }

    fn get_event(&self, id: &ObjectId) -> Result<Event, EventLogError> {
        let value = self.read_existing(id, "event")?;
        decode_event(&value)
    }
}

// =============================================================================
// RECORD WRITERS
// =============================================================================

/// Create the event record from its already-encoded bytes, stored verbatim.
pub fn event_created(id: ObjectId, encoded: Vec<u8>) -> StateChange {
    StateChange::new(StateAction::Create, id, CONTRACT_NAME, encoded)
}

pub fn bucket_created(id: ObjectId, bucket: &Bucket) -> Result<StateChange, EventLogError> {
    Ok(StateChange::new(
        StateAction::Create,
        id,
        CONTRACT_NAME,
        encode_bucket(bucket)?,
    ))
}

/// Rewrite an existing bucket in place.
pub fn bucket_updated(id: ObjectId, bucket: &Bucket) -> Result<StateChange, EventLogError> {
    Ok(StateChange::new(
        StateAction::Update,
        id,
        CONTRACT_NAME,
        encode_bucket(bucket)?,
    ))
}

/// Point the head pointer at `head`, creating the pointer on first use.
pub fn head_pointer_set(
    action: StateAction,
    head: &ObjectId,
) -> Result<StateChange, EventLogError> {
    Ok(StateChange::new(
        action,
        HEAD_POINTER_KEY,
        CONTRACT_NAME,
        encode_head_pointer(head)?,
    ))
}

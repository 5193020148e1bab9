//! # Outbound Ports (Driven Ports)
//!
//! SPIs required by the Event Log subsystem.
//!
//! - [`Ledger`]: the consensus ledger collaborator (genesis, transactions,
//!   proofs, state views, contract registry)
//! - [`BucketStore`]: typed read access to the bucket chain in one state view
//! - [`TimeSource`]: wall clock, injectable for tests

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{
    ContractHandler, GenesisRequest, InclusionProof, InstanceId, LedgerError, ObjectId,
    StateView, Transaction,
};

use crate::domain::{Bucket, Event, EventLogError};

/// Abstract interface to the consensus ledger.
///
/// Block production, ordering and proof generation all happen behind this
/// port. Nothing here is retried; retry policy belongs to the caller.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Snapshot handle returned by [`Ledger::get_state_view`].
    type View: StateView + 'static;

    /// Bootstrap a new ledger instance.
    async fn create_genesis(&self, request: GenesisRequest) -> Result<InstanceId, LedgerError>;

    /// Submit a transaction for inclusion in a future block.
    async fn submit_transaction(
        &self,
        instance: InstanceId,
        transaction: Transaction,
    ) -> Result<(), LedgerError>;

    /// Fetch a proof that `key` is present in the instance's current state.
    async fn get_proof(
        &self,
        instance: InstanceId,
        key: ObjectId,
    ) -> Result<InclusionProof, LedgerError>;

    /// Get a read-only snapshot of the instance's current state.
    async fn get_state_view(&self, instance: InstanceId) -> Result<Self::View, LedgerError>;

    /// Register the handler run for spawns of contract `name`.
    fn register_contract(
        &self,
        name: &str,
        handler: Arc<dyn ContractHandler>,
    ) -> Result<(), LedgerError>;
}

/// Typed read access to bucket-chain records in one state snapshot.
pub trait BucketStore {
    /// Read the head pointer and the bucket it names.
    ///
    /// ## Returns
    ///
    /// - `Ok(None)`: no head pointer yet, the log is empty
    /// - `Ok(Some((id, bucket)))`: the current head
    /// - `Err(CorruptChain)`: the head pointer names a missing bucket
    fn get_head(&self) -> Result<Option<(ObjectId, Bucket)>, EventLogError>;

    /// Read a bucket; a missing bucket is `CorruptChain`.
    fn get_bucket(&self, id: &ObjectId) -> Result<Bucket, EventLogError>;

    /// Read an event; a missing event is `CorruptChain`.
    fn get_event(&self, id: &ObjectId) -> Result<Event, EventLogError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current time in nanoseconds since the Unix epoch.
    fn now_nanos(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_nanos(&self) -> i64 {
        (**self).now_nanos()
    }
}

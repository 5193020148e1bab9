//! # Event-Log Contract
//!
//! The contract the ledger runs for every event-log instruction. It accepts
//! exactly one kind of request, a spawn carrying an encoded event, validates
//! the event's timestamp against the validation time, and returns the state
//! changes that store and index it.
//!
//! The contract only reads the state view the ledger hands it. Applying the
//! returned changes, and rejecting the whole transaction on error, is the
//! ledger's job.

use std::time::Duration;

use shared_types::{
    find_argument, ContractHandler, Instruction, InstructionKind, LedgerError, StateChange,
    StateView,
};
use tracing::{debug, warn};

use crate::adapters::LedgerBucketStore;
use crate::domain::{
    decode_event, validate_timestamp, EventLogError, CONTRACT_NAME, EVENT_ARGUMENT,
};
use crate::index::{BucketChainWriter, NewObjectIds};
use crate::ports::TimeSource;

/// Event-log contract bound to a clock and a bucket age limit.
pub struct EventLogContract<C> {
    writer: BucketChainWriter,
    clock: C,
}

impl<C: TimeSource> EventLogContract<C> {
    pub fn new(bucket_max_age: Duration, clock: C) -> Self {
        Self {
            writer: BucketChainWriter::new(bucket_max_age),
            clock,
        }
    }

    /// Validate one instruction and build the changes that record its event.
    pub fn execute(
        &self,
        view: &dyn StateView,
        instruction: &Instruction,
    ) -> Result<Vec<StateChange>, EventLogError> {
        let args = match &instruction.kind {
            InstructionKind::Spawn { contract_id, args } if contract_id == CONTRACT_NAME => args,
            InstructionKind::Spawn { contract_id, .. } => {
                return Err(EventLogError::MalformedRequest(format!(
                    "spawn of contract {contract_id}, expected {CONTRACT_NAME}"
                )));
            }
            InstructionKind::Invoke { .. } => {
                return Err(EventLogError::UnsupportedOperation("invoke"))
            }
            InstructionKind::Delete { .. } => {
                return Err(EventLogError::UnsupportedOperation("delete"))
            }
        };

        let encoded = find_argument(args, EVENT_ARGUMENT).ok_or_else(|| {
            EventLogError::MalformedRequest(format!("missing argument {EVENT_ARGUMENT}"))
        })?;
        let event = decode_event(encoded)?;
        validate_timestamp(&event, self.clock.now_nanos())?;

        let ids = NewObjectIds::derive(instruction);
        let store = LedgerBucketStore::new(view);
        let changes = self.writer.insert(&store, &event, encoded.to_vec(), &ids)?;
        debug!(event = %ids.event, changes = changes.len(), "Event accepted");
        Ok(changes)
    }
}

impl<C: TimeSource> ContractHandler for EventLogContract<C> {
    fn execute(
        &self,
        view: &dyn StateView,
        instruction: &Instruction,
    ) -> Result<Vec<StateChange>, LedgerError> {
        EventLogContract::execute(self, view, instruction).map_err(|e| {
            warn!(error = %e, "Event-log instruction rejected");
            match e {
                EventLogError::Ledger(inner) => inner,
                other => LedgerError::ContractRejected {
                    contract: CONTRACT_NAME.to_string(),
                    reason: other.to_string(),
                },
            }
        })
    }
}

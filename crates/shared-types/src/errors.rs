//! # Error Types
//!
//! Errors reported by the ledger collaborator.

use thiserror::Error;

use crate::entities::{InstanceId, ObjectId};

/// Errors that can occur when talking to a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No ledger instance with this id.
    #[error("Unknown ledger instance: {0:?}")]
    UnknownInstance(InstanceId),

    /// No contract registered under this name.
    #[error("Unknown contract: {0}")]
    UnknownContract(String),

    /// A contract is already registered under this name.
    #[error("Contract already registered: {0}")]
    ContractAlreadyRegistered(String),

    /// A `Create` state change targeted an existing key.
    #[error("Object already exists: {0:?}")]
    ObjectExists(ObjectId),

    /// An `Update`/`Remove` state change or an invoke targeted a missing key.
    #[error("Object missing: {0:?}")]
    ObjectMissing(ObjectId),

    /// The contract refused the instruction; the transaction was not applied.
    #[error("Contract {contract} rejected instruction: {reason}")]
    ContractRejected { contract: String, reason: String },

    /// The ledger could not be reached.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

//! # Domain Errors
//!
//! Error taxonomy of the event log.
//!
//! An empty log is not an error: a missing head pointer surfaces as `Ok(None)`
//! from [`crate::ports::BucketStore::get_head`], which the writer turns into a
//! bootstrap and the reader into an empty result.

use shared_types::{LedgerError, ObjectId};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while accepting, indexing or searching events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventLogError {
    /// The request or transaction has the wrong shape.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// A stored or submitted record does not decode.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Transaction type not permitted by the event-log contract.
    #[error("Unsupported operation: {0} not allowed")]
    UnsupportedOperation(&'static str),

    /// Event timestamp lies after the validation time.
    #[error("Event timestamp is in the future: when {when}, now {now}")]
    TimestampInFuture { when: i64, now: i64 },

    /// Event timestamp lies before the accepted skew window.
    #[error("Event timestamp too long ago: when {when}, now {now}, tolerance {tolerance_ns}ns")]
    TimestampTooOld {
        when: i64,
        now: i64,
        tolerance_ns: i64,
    },

    /// A bucket or event reference does not resolve; the index is untrustworthy.
    #[error("Corrupt bucket chain at {id:?}: {reason}")]
    CorruptChain { id: ObjectId, reason: String },

    /// The ledger answered with an absence proof.
    #[error("Not an inclusion proof for key {key:?}")]
    NotInclusionProof { key: ObjectId },

    /// The ledger proved a different key than the one requested.
    #[error("Wrong key in proof: expected {expected:?}, got {actual:?}")]
    KeyMismatch { expected: ObjectId, actual: ObjectId },

    /// No ledger instance was named.
    #[error("Ledger instance id required")]
    MissingInstance,

    /// The service was configured with unusable values.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Ledger or transport failure, never retried here.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl EventLogError {
    /// Returns true if the error means the stored index can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CorruptChain { .. })
    }

    pub(crate) fn corrupt(id: ObjectId, reason: impl Into<String>) -> Self {
        Self::CorruptChain {
            id,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EventLogError>;

//! # Ledger Interfaces
//!
//! Traits through which the ledger and its hosted contracts talk to each other.
//!
//! The ledger owns the state and its ordering: contracts only ever see a
//! read-only [`StateView`] and answer with a list of [`StateChange`]s, which the
//! ledger applies all-or-nothing as part of a block.

use crate::entities::{Instruction, ObjectId, StateChange, StateRecord};
use crate::errors::LedgerError;

/// Read handle on the key/value state of one ledger instance.
///
/// A view is a point-in-time snapshot: writes validated for later blocks are
/// never observed through an existing view.
pub trait StateView: Send + Sync {
    /// Fetch the record stored at `key`, `None` if absent.
    fn get(&self, key: &ObjectId) -> Result<Option<StateRecord>, LedgerError>;
}

impl<V: StateView + ?Sized> StateView for &V {
    fn get(&self, key: &ObjectId) -> Result<Option<StateRecord>, LedgerError> {
        (**self).get(key)
    }
}

/// A contract executed by the ledger while validating transactions.
///
/// Handlers run inside the ledger's sequential validation pipeline for an
/// instance, so they never race with another mutation of the same state.
pub trait ContractHandler: Send + Sync {
    /// Validate `instruction` against `view` and return the state changes to apply.
    fn execute(
        &self,
        view: &dyn StateView,
        instruction: &Instruction,
    ) -> Result<Vec<StateChange>, LedgerError>;
}

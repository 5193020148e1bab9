//! # Domain Layer
//!
//! Pure domain logic for the Event Log subsystem: the records kept in ledger
//! state, their codec, and the error taxonomy.
//!
//! This module contains NO I/O dependencies. Ledger access is abstracted
//! through the traits in the `ports` module.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use codec::*;
pub use entities::*;
pub use errors::*;
pub use value_objects::*;

//! # Shared Types Crate
//!
//! This crate contains the ledger-facing entities and interfaces shared between
//! the consensus ledger and the contracts it hosts.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Object ids, instructions and state changes are
//!   defined once here and used by every contract.
//! - **Ledger Owns State**: Contracts read through a [`StateView`] and return
//!   [`StateChange`]s; they never mutate state themselves.
//! - **Derived Identity**: Every created object's id is derived from the
//!   instruction that created it (see [`Instruction::derive_id`]).

pub mod entities;
pub mod errors;
pub mod ledger;

pub use entities::*;
pub use errors::*;
pub use ledger::*;

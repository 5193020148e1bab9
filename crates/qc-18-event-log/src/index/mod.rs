//! # Bucket Chain Index
//!
//! The time index over stored events: a singly-linked list of buckets, newest
//! first, ending in a catch-all sentinel.
//!
//! - [`writer`]: places new events and emits the state changes.
//! - [`reader`]: time-range / topic search.
//! - [`pager`]: gap-free pagination over capped searches.

pub mod bootstrap;
mod chain;
pub mod pager;
pub mod reader;
pub mod writer;

pub use bootstrap::bootstrap_changes;
pub use pager::SearchPager;
pub use reader::BucketChainReader;
pub use writer::{BucketChainWriter, NewObjectIds, Placement};

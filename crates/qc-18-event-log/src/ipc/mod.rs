//! # IPC Layer
//!
//! Request and response payloads for the Event Log service boundary.

pub mod payloads;

pub use payloads::*;

//! # Ports Layer
//!
//! Hexagonal architecture ports (interfaces) for the Event Log subsystem.
//!
//! - **Driving Ports (Inbound)**: APIs consumed by clients and adapters
//! - **Driven Ports (Outbound)**: SPIs implemented by adapters (ledger, store, clock)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

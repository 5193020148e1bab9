//! # Inbound Ports (Driving Ports)
//!
//! Public API exposed by the Event Log subsystem.

use async_trait::async_trait;

use crate::domain::EventLogError;
use crate::ipc::{
    GetEventRequest, GetEventResponse, InitRequest, InitResponse, LogRequest, LogResponse,
    SearchRequest, SearchResponse,
};

/// Primary API for the Event Log subsystem.
///
/// Thin wrappers around the ledger; the indexing itself runs inside the
/// ledger as the registered event-log contract.
#[async_trait]
pub trait EventLogApi: Send + Sync {
    /// Create a new event log (a new ledger instance).
    async fn init(&self, request: InitRequest) -> Result<InitResponse, EventLogError>;

    /// Submit a transaction carrying one event.
    ///
    /// Returns once the ledger accepted the submission; inclusion is reported
    /// by the ledger, not here.
    async fn log(&self, request: LogRequest) -> Result<LogResponse, EventLogError>;

    /// Fetch one stored event by key, checked against an inclusion proof.
    ///
    /// ## Returns
    ///
    /// - `Err(NotInclusionProof)`: the key is not in the state
    /// - `Err(KeyMismatch)`: the ledger proved a different key
    async fn get_event(&self, request: GetEventRequest) -> Result<GetEventResponse, EventLogError>;

    /// Search by time range and topic.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, EventLogError>;
}

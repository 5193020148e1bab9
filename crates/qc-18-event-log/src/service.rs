//! # Event Log Service
//!
//! Client-facing surface of the event log. Writes go through the ledger, which
//! runs the registered [`EventLogContract`]; reads go through state snapshots
//! and inclusion proofs.
//!
//! ## Consistency
//!
//! Every search reads one state snapshot obtained up front, so a concurrent
//! block cannot tear the walk across two versions of the chain.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Argument, GenesisRequest, InstanceId, Instruction, ObjectId, Transaction};
use tracing::{debug, info, instrument, warn};

use crate::adapters::LedgerBucketStore;
use crate::config::EventLogConfig;
use crate::contract::EventLogContract;
use crate::domain::{
    decode_event, encode_event, labels, Event, EventLogError, IndexedEvent, CONTRACT_NAME,
    EVENT_ARGUMENT,
};
use crate::index::{BucketChainReader, SearchPager};
use crate::ipc::{
    GetEventRequest, GetEventResponse, InitRequest, InitResponse, LogRequest, LogResponse,
    SearchRequest, SearchResponse,
};
use crate::ports::{EventLogApi, Ledger, TimeSource};

/// The main Event Log service.
pub struct EventLogService<L, C> {
    ledger: Arc<L>,
    clock: Arc<C>,
    config: EventLogConfig,
    reader: BucketChainReader,
}

impl<L, C> EventLogService<L, C>
where
    L: Ledger,
    C: TimeSource + 'static,
{
    /// Create the service and register the event-log contract with `ledger`.
    pub fn new(
        ledger: Arc<L>,
        clock: Arc<C>,
        config: EventLogConfig,
    ) -> Result<Self, EventLogError> {
        config.validate()?;
        let contract = EventLogContract::new(config.bucket_max_age, Arc::clone(&clock));
        ledger.register_contract(CONTRACT_NAME, Arc::new(contract))?;
        info!(
            bucket_max_age_ms = config.bucket_max_age.as_millis() as u64,
            search_max = config.search_max,
            "Event log contract registered"
        );

        Ok(Self {
            reader: BucketChainReader::new(config.search_max),
            ledger,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &EventLogConfig {
        &self.config
    }

    /// Submit `event` in a single-instruction transaction.
    ///
    /// Returns the key the event will be stored under once the transaction is
    /// included.
    #[instrument(skip(self, event), fields(topic = %event.topic))]
    pub async fn log_event(
        &self,
        instance_id: InstanceId,
        event: &Event,
    ) -> Result<ObjectId, EventLogError> {
        let instruction = Instruction::spawn(
            CONTRACT_NAME,
            vec![Argument::new(EVENT_ARGUMENT, encode_event(event)?)],
        );
        let key = instruction.derive_id(labels::EVENT);
        self.log(LogRequest {
            instance_id,
            transaction: Transaction::single(instruction),
        })
        .await?;
        Ok(key)
    }

    /// Every match of `request`, fetched in pages of `page_size` from one snapshot.
    #[instrument(skip(self, request), fields(instance = %request.instance_id))]
    pub async fn search_all(
        &self,
        request: SearchRequest,
        page_size: usize,
    ) -> Result<Vec<IndexedEvent>, EventLogError> {
        let instance_id = require_instance(request.instance_id)?;
        let store = LedgerBucketStore::new(self.ledger.get_state_view(instance_id).await?);
        let now = self.clock.now_nanos();
        SearchPager::new(request.query(), page_size).collect_all(&self.reader, &store, now)
    }
}

fn require_instance(id: InstanceId) -> Result<InstanceId, EventLogError> {
    if id.is_null() {
        return Err(EventLogError::MissingInstance);
    }
    Ok(id)
}

#[async_trait]
impl<L, C> EventLogApi for EventLogService<L, C>
where
    L: Ledger,
    C: TimeSource + 'static,
{
    #[instrument(skip(self, request), fields(nodes = request.roster.nodes.len()))]
    async fn init(&self, request: InitRequest) -> Result<InitResponse, EventLogError> {
        let block_interval = if request.block_interval.is_zero() {
            self.config.block_interval
        } else {
            request.block_interval
        };
        let id = self
            .ledger
            .create_genesis(GenesisRequest {
                roster: request.roster,
                owner_policy: request.owner,
                block_interval,
            })
            .await?;
        info!(instance = %id, "Event log created");
        Ok(InitResponse { id })
    }

    #[instrument(skip(self, request), fields(instance = %request.instance_id))]
    async fn log(&self, request: LogRequest) -> Result<LogResponse, EventLogError> {
        let instance_id = require_instance(request.instance_id)?;
        let instructions = request.transaction.instructions.len();
        self.ledger
            .submit_transaction(instance_id, request.transaction)
            .await
            .map_err(|e| {
                warn!(error = %e, "Transaction submission failed");
                e
            })?;
        debug!(instructions, "Transaction submitted");
        Ok(LogResponse::default())
    }

    #[instrument(skip(self, request), fields(instance = %request.instance_id, key = %request.key))]
    async fn get_event(&self, request: GetEventRequest) -> Result<GetEventResponse, EventLogError> {
        let instance_id = require_instance(request.instance_id)?;
        let proof = self.ledger.get_proof(instance_id, request.key).await?;

        if !proof.is_inclusion_match() {
            return Err(EventLogError::NotInclusionProof { key: request.key });
        }
        if proof.key != request.key {
            return Err(EventLogError::KeyMismatch {
                expected: request.key,
                actual: proof.key,
            });
        }
        let record = proof
            .record
            .ok_or(EventLogError::NotInclusionProof { key: request.key })?;
        if record.contract_id != CONTRACT_NAME {
            return Err(EventLogError::MalformedRecord(format!(
                "key holds a {} record",
                record.contract_id
            )));
        }

        let event = decode_event(&record.value)?;
        Ok(GetEventResponse { event })
    }

    #[instrument(skip(self, request), fields(instance = %request.instance_id))]
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, EventLogError> {
        let instance_id = require_instance(request.instance_id)?;
        let store = LedgerBucketStore::new(self.ledger.get_state_view(instance_id).await?);
        let now = self.clock.now_nanos();

        let result = self.reader.search(&store, &request.query(), now)?;
        debug!(
            events = result.events.len(),
            truncated = result.truncated,
            "Search completed"
        );
        Ok(SearchResponse {
            events: result.events,
            truncated: result.truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryLedger, ManualClock};
    use shared_types::{InstructionKind, LedgerError, Roster};
    use std::time::Duration;

    const SEC: i64 = 1_000_000_000;

    fn service(now: i64) -> (EventLogService<InMemoryLedger, ManualClock>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let service = EventLogService::new(
            Arc::new(InMemoryLedger::new()),
            Arc::clone(&clock),
            EventLogConfig::default(),
        )
        .unwrap();
        (service, clock)
    }

    async fn init(service: &EventLogService<InMemoryLedger, ManualClock>) -> InstanceId {
        service
            .init(InitRequest {
                roster: Roster::new(["node-1"]),
                owner: b"owner".to_vec(),
                block_interval: Duration::ZERO,
            })
            .await
            .unwrap()
            .id
    }

    // ========== Test Group 1: Init ==========

    #[tokio::test]
    async fn test_init_uses_default_block_interval() {
        let ledger = Arc::new(InMemoryLedger::new());
        let service = EventLogService::new(
            Arc::clone(&ledger),
            Arc::new(ManualClock::new(0)),
            EventLogConfig::default(),
        )
        .unwrap();
        let id = init(&service).await;

        assert!(!id.is_null());
        let genesis = ledger.genesis(id).unwrap();
        assert_eq!(genesis.block_interval, Duration::from_secs(5));
        assert_eq!(genesis.owner_policy, b"owner".to_vec());
    }

    #[test]
    fn test_contract_registered_once() {
        let ledger = Arc::new(InMemoryLedger::new());
        let clock = Arc::new(ManualClock::new(0));
        EventLogService::new(Arc::clone(&ledger), Arc::clone(&clock), EventLogConfig::default())
            .unwrap();
        let second = EventLogService::new(ledger, clock, EventLogConfig::default());
        assert!(matches!(
            second,
            Err(EventLogError::Ledger(LedgerError::ContractAlreadyRegistered(_)))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EventLogConfig {
            search_max: 0,
            ..Default::default()
        };
        let result = EventLogService::new(
            Arc::new(InMemoryLedger::new()),
            Arc::new(ManualClock::new(0)),
            config,
        );
        assert!(matches!(result, Err(EventLogError::Config(_))));
    }

    // ========== Test Group 2: Log and Get ==========

    #[tokio::test]
    async fn test_log_then_get_event() {
        let (service, _) = service(100 * SEC);
        let id = init(&service).await;
        let event = Event::at(100 * SEC, "login", b"alice".to_vec());

        let key = service.log_event(id, &event).await.unwrap();
        let fetched = service
            .get_event(GetEventRequest {
                instance_id: id,
                key,
            })
            .await
            .unwrap();
        assert_eq!(fetched.event, event);
    }

    #[tokio::test]
    async fn test_get_unknown_key_is_not_inclusion() {
        let (service, _) = service(100 * SEC);
        let id = init(&service).await;
        let key = ObjectId([7; 32]);

        let err = service
            .get_event(GetEventRequest {
                instance_id: id,
                key,
            })
            .await
            .unwrap_err();
        assert_eq!(err, EventLogError::NotInclusionProof { key });
    }

    #[tokio::test]
    async fn test_get_bucket_key_is_not_an_event() {
        let (service, _) = service(100 * SEC);
        let id = init(&service).await;
        let event = Event::at(100 * SEC, "t", vec![]);
        let instruction = Instruction::spawn(
            CONTRACT_NAME,
            vec![Argument::new(EVENT_ARGUMENT, encode_event(&event).unwrap())],
        );
        let bucket_key = instruction.derive_id(labels::BUCKET);
        service
            .log(LogRequest {
                instance_id: id,
                transaction: Transaction::single(instruction),
            })
            .await
            .unwrap();

        let result = service
            .get_event(GetEventRequest {
                instance_id: id,
                key: bucket_key,
            })
            .await;
        assert!(matches!(result, Err(EventLogError::MalformedRecord(_))));
    }

    #[tokio::test]
    async fn test_rejected_event_surfaces_ledger_error() {
        let (service, _) = service(100 * SEC);
        let id = init(&service).await;

        let err = service
            .log_event(id, &Event::at(200 * SEC, "t", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EventLogError::Ledger(LedgerError::ContractRejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_is_rejected() {
        let (service, _) = service(100 * SEC);
        let id = init(&service).await;
        let key = service
            .log_event(id, &Event::at(100 * SEC, "t", vec![]))
            .await
            .unwrap();

        let delete = Instruction {
            nonce: [1; 16],
            kind: InstructionKind::Delete { target: key },
        };
        let result = service
            .log(LogRequest {
                instance_id: id,
                transaction: Transaction::single(delete),
            })
            .await;
        assert!(result.is_err());

        // The event is untouched.
        assert!(service
            .get_event(GetEventRequest {
                instance_id: id,
                key
            })
            .await
            .is_ok());
    }

    // ========== Test Group 3: Search ==========

    #[tokio::test]
    async fn test_search_requires_instance() {
        let (service, _) = service(0);
        let err = service.search(SearchRequest::default()).await.unwrap_err();
        assert_eq!(err, EventLogError::MissingInstance);
    }

    #[tokio::test]
    async fn test_search_empty_log() {
        let (service, _) = service(100 * SEC);
        let id = init(&service).await;
        let response = service
            .search(SearchRequest {
                instance_id: id,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(response.events.is_empty());
        assert!(!response.truncated);
    }

    #[tokio::test]
    async fn test_search_by_topic_and_time() {
        let (service, clock) = service(0);
        let id = init(&service).await;
        for (secs, topic) in [(1, "a"), (2, "b"), (8, "a"), (9, "b")] {
            clock.set(secs * SEC);
            service
                .log_event(id, &Event::at(secs * SEC, topic, vec![]))
                .await
                .unwrap();
        }
        clock.set(20 * SEC);

        let response = service
            .search(SearchRequest {
                instance_id: id,
                from: 0,
                to: 0,
                topic: "a".into(),
            })
            .await
            .unwrap();
        let whens: Vec<_> = response.events.iter().map(|h| h.event.when / SEC).collect();
        assert_eq!(whens, vec![1, 8]);

        let response = service
            .search(SearchRequest {
                instance_id: id,
                from: 2 * SEC,
                to: 9 * SEC,
                topic: String::new(),
            })
            .await
            .unwrap();
        let whens: Vec<_> = response.events.iter().map(|h| h.event.when / SEC).collect();
        assert_eq!(whens, vec![2, 8]);
    }

    #[tokio::test]
    async fn test_search_all_pages_through_everything() {
        let (service, clock) = service(0);
        let id = init(&service).await;
        for secs in 1..=7 {
            clock.set(secs * SEC);
            service
                .log_event(id, &Event::at(secs * SEC, "t", vec![]))
                .await
                .unwrap();
        }

        let all = service
            .search_all(
                SearchRequest {
                    instance_id: id,
                    ..Default::default()
                },
                3,
            )
            .await
            .unwrap();
        // `to == 0` resolves to now (7s), which excludes the event at 7s.
        assert_eq!(all.len(), 6);
    }
}

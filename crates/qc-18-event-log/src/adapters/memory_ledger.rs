//! # In-Memory Ledger
//!
//! Single-process implementation of the [`Ledger`] port for tests and local runs.
//! A production deployment talks to the consensus ledger instead.
//!
//! ## Model
//!
//! - One submitted transaction becomes one block.
//! - Instructions are validated in order, each seeing the changes of the ones
//!   before it; the transaction is committed all-or-nothing.
//! - State is copy-on-write: a [`MemoryView`] handed out earlier keeps seeing
//!   the state it was taken from.
//! - Each instance has its own lock; instances never wait on each other.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use sha2::{Digest, Sha256};
use shared_types::{
    ContractHandler, GenesisRequest, Hash, InclusionProof, InstanceId, Instruction,
    InstructionKind, LedgerError, ObjectId, StateAction, StateChange, StateRecord, StateView,
    Transaction,
};
use tracing::{debug, info, warn};

use crate::ports::Ledger;

// =============================================================================
// STATE VIEW
// =============================================================================

/// Immutable snapshot of one instance's key/value state.
#[derive(Debug, Clone, Default)]
pub struct MemoryView {
    state: Arc<BTreeMap<ObjectId, StateRecord>>,
    height: u64,
}

impl MemoryView {
    /// Number of blocks applied to reach this state.
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Return a new snapshot with `changes` applied; `self` is left untouched.
    ///
    /// Fails without applying anything if any change violates its action's
    /// precondition.
    pub fn apply(&self, changes: &[StateChange]) -> Result<Self, LedgerError> {
        let mut next = (*self.state).clone();
        for change in changes {
            let exists = next.contains_key(&change.key);
            match change.action {
                StateAction::Create if exists => return Err(LedgerError::ObjectExists(change.key)),
                StateAction::Update | StateAction::Remove if !exists => {
                    return Err(LedgerError::ObjectMissing(change.key))
                }
                StateAction::Remove => {
                    next.remove(&change.key);
                }
                StateAction::Create | StateAction::Update => {
                    next.insert(
                        change.key,
                        StateRecord {
                            value: change.value.clone(),
                            contract_id: change.contract_id.clone(),
                        },
                    );
                }
            }
        }
        Ok(Self {
            state: Arc::new(next),
            height: self.height,
        })
    }

    /// SHA-256 commitment over every entry, in key order.
    pub fn state_root(&self) -> Hash {
        let mut hasher = Sha256::new();
        for (key, record) in self.state.iter() {
            hasher.update(key.0);
            hasher.update((record.contract_id.len() as u64).to_le_bytes());
            hasher.update(record.contract_id.as_bytes());
            hasher.update((record.value.len() as u64).to_le_bytes());
            hasher.update(&record.value);
        }
        hasher.finalize().into()
    }

    fn next_block(self) -> Self {
        Self {
            height: self.height + 1,
            ..self
        }
    }
}

impl StateView for MemoryView {
    fn get(&self, key: &ObjectId) -> Result<Option<StateRecord>, LedgerError> {
        Ok(self.state.get(key).cloned())
    }
}

// =============================================================================
// LEDGER
// =============================================================================

struct LedgerInstance {
    genesis: GenesisRequest,
    head: MemoryView,
}

/// In-memory ledger hosting any number of independent instances.
#[derive(Default)]
pub struct InMemoryLedger {
    instances: RwLock<HashMap<InstanceId, Arc<Mutex<LedgerInstance>>>>,
    contracts: RwLock<HashMap<String, Arc<dyn ContractHandler>>>,
    genesis_counter: AtomicU64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Genesis parameters of an instance.
    pub fn genesis(&self, instance: InstanceId) -> Result<GenesisRequest, LedgerError> {
        Ok(self.instance(instance)?.lock().genesis.clone())
    }

    fn instance(&self, id: InstanceId) -> Result<Arc<Mutex<LedgerInstance>>, LedgerError> {
        self.instances
            .read()
            .get(&id)
            .cloned()
            .ok_or(LedgerError::UnknownInstance(id))
    }

    fn genesis_sync(&self, request: GenesisRequest) -> InstanceId {
        let sequence = self.genesis_counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(sequence.to_le_bytes());
        for node in &request.roster.nodes {
            hasher.update((node.len() as u64).to_le_bytes());
            hasher.update(node.as_bytes());
        }
        hasher.update((request.owner_policy.len() as u64).to_le_bytes());
        hasher.update(&request.owner_policy);
        hasher.update(request.block_interval.as_nanos().to_le_bytes());
        let id = InstanceId(hasher.finalize().into());

        info!(instance = %id, nodes = request.roster.nodes.len(), "Created ledger instance");
        let instance = LedgerInstance {
            genesis: request,
            head: MemoryView::default(),
        };
        self.instances
            .write()
            .insert(id, Arc::new(Mutex::new(instance)));
        id
    }

    fn handler_for(
        &self,
        view: &MemoryView,
        instruction: &Instruction,
    ) -> Result<(String, Arc<dyn ContractHandler>), LedgerError> {
        let contract = match &instruction.kind {
            InstructionKind::Spawn { contract_id, .. } => contract_id.clone(),
            InstructionKind::Invoke { target, .. } | InstructionKind::Delete { target } => {
                view.get(target)?
                    .ok_or(LedgerError::ObjectMissing(*target))?
                    .contract_id
            }
        };
        let handler = self
            .contracts
            .read()
            .get(&contract)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownContract(contract.clone()))?;
        Ok((contract, handler))
    }

    fn submit_sync(&self, id: InstanceId, transaction: Transaction) -> Result<(), LedgerError> {
        let instance = self.instance(id)?;
        let mut instance = instance.lock();

        let mut working = instance.head.clone();
        for instruction in &transaction.instructions {
            let (contract, handler) = self.handler_for(&working, instruction)?;
            let changes = handler.execute(&working, instruction).map_err(|e| {
                warn!(instance = %id, contract = %contract, error = %e, "Transaction rejected");
                e
            })?;
            working = working.apply(&changes)?;
        }

        instance.head = working.next_block();
        debug!(
            instance = %id,
            height = instance.head.height(),
            instructions = transaction.instructions.len(),
            "Applied block"
        );
        Ok(())
    }

    fn proof_sync(&self, id: InstanceId, key: ObjectId) -> Result<InclusionProof, LedgerError> {
        let head = self.view_sync(id)?;
        Ok(InclusionProof {
            key,
            record: head.get(&key)?,
            state_root: head.state_root(),
            height: head.height(),
        })
    }

    fn view_sync(&self, id: InstanceId) -> Result<MemoryView, LedgerError> {
        Ok(self.instance(id)?.lock().head.clone())
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    type View = MemoryView;

    async fn create_genesis(&self, request: GenesisRequest) -> Result<InstanceId, LedgerError> {
        Ok(self.genesis_sync(request))
    }

    async fn submit_transaction(
        &self,
        instance: InstanceId,
        transaction: Transaction,
    ) -> Result<(), LedgerError> {
        self.submit_sync(instance, transaction)
    }

    async fn get_proof(
        &self,
        instance: InstanceId,
        key: ObjectId,
    ) -> Result<InclusionProof, LedgerError> {
        self.proof_sync(instance, key)
    }

    async fn get_state_view(&self, instance: InstanceId) -> Result<MemoryView, LedgerError> {
        self.view_sync(instance)
    }

    fn register_contract(
        &self,
        name: &str,
        handler: Arc<dyn ContractHandler>,
    ) -> Result<(), LedgerError> {
        let mut contracts = self.contracts.write();
        if contracts.contains_key(name) {
            return Err(LedgerError::ContractAlreadyRegistered(name.to_string()));
        }
        contracts.insert(name.to_string(), handler);
        Ok(())
    }
}

//! # Ledger Entities
//!
//! Defines the ledger-facing types exchanged between the consensus ledger and
//! the contracts it hosts.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `ObjectId`, `InstanceId`
//! - **Genesis**: `Roster`, `GenesisRequest`
//! - **Transactions**: `Argument`, `Instruction`, `InstructionKind`, `Transaction`
//! - **State**: `StateAction`, `StateChange`, `StateRecord`, `InclusionProof`

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// Address of a record in a ledger instance's key/value state.
///
/// Object ids are derived from the creating instruction, so they are stable and
/// collision-free within one ledger instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ObjectId(pub Hash);

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Identifier of one ledger instance (the hash of its genesis block).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct InstanceId(pub Hash);

impl InstanceId {
    /// The all-zero id, never assigned to a real instance.
    pub const NULL: Self = Self([0u8; 32]);

    /// Returns true for the all-zero id.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// =============================================================================
// CLUSTER B: GENESIS
// =============================================================================

/// The set of nodes maintaining a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Network addresses of the participating nodes.
    pub nodes: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parameters for bootstrapping a new ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisRequest {
    /// Nodes that will run consensus for the instance.
    pub roster: Roster,
    /// Opaque owner policy naming who may submit transactions.
    pub owner_policy: Vec<u8>,
    /// Target interval between blocks.
    pub block_interval: Duration,
}

// =============================================================================
// CLUSTER C: TRANSACTIONS
// =============================================================================

/// A named argument carried by an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: Vec<u8>,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Look up a named argument.
pub fn find_argument<'a>(args: &'a [Argument], name: &str) -> Option<&'a [u8]> {
    args.iter()
        .find(|arg| arg.name == name)
        .map(|arg| arg.value.as_slice())
}

/// What an instruction asks the ledger to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Create new objects owned by `contract_id`.
    Spawn {
        contract_id: String,
        args: Vec<Argument>,
    },
    /// Run `command` against the existing object `target`.
    Invoke {
        target: ObjectId,
        command: String,
        args: Vec<Argument>,
    },
    /// Remove the existing object `target`.
    Delete { target: ObjectId },
}

/// A single instruction inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Client-chosen nonce; keeps ids unique for otherwise identical instructions.
    pub nonce: [u8; 16],
    pub kind: InstructionKind,
}

impl Instruction {
    /// Build a spawn instruction with a random nonce.
    pub fn spawn(contract_id: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            nonce: uuid::Uuid::new_v4().into_bytes(),
            kind: InstructionKind::Spawn {
                contract_id: contract_id.into(),
                args,
            },
        }
    }

    /// Replace the nonce (deterministic ids in tests and replays).
    pub fn with_nonce(mut self, nonce: [u8; 16]) -> Self {
        self.nonce = nonce;
        self
    }

    /// Canonical hash of the instruction.
    ///
    /// Every variable-length field is length-prefixed so distinct instructions
    /// never share a preimage.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce);
        match &self.kind {
            InstructionKind::Spawn { contract_id, args } => {
                hasher.update([0u8]);
                hash_bytes(&mut hasher, contract_id.as_bytes());
                hash_args(&mut hasher, args);
            }
            InstructionKind::Invoke {
                target,
                command,
                args,
            } => {
                hasher.update([1u8]);
                hasher.update(target.0);
                hash_bytes(&mut hasher, command.as_bytes());
                hash_args(&mut hasher, args);
            }
            InstructionKind::Delete { target } => {
                hasher.update([2u8]);
                hasher.update(target.0);
            }
        }
        hasher.finalize().into()
    }

    /// Derive the id of an object created by this instruction.
    ///
    /// `SHA-256(instruction hash || label)`; different labels give independent ids.
    pub fn derive_id(&self, label: &str) -> ObjectId {
        let mut hasher = Sha256::new();
        hasher.update(self.hash());
        hasher.update(label.as_bytes());
        ObjectId(hasher.finalize().into())
    }
}

fn hash_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn hash_args(hasher: &mut Sha256, args: &[Argument]) {
    hasher.update((args.len() as u64).to_le_bytes());
    for arg in args {
        hash_bytes(hasher, arg.name.as_bytes());
        hash_bytes(hasher, &arg.value);
    }
}

/// An ordered batch of instructions applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub instructions: Vec<Instruction>,
}

impl Transaction {
    pub fn single(instruction: Instruction) -> Self {
        Self {
            instructions: vec![instruction],
        }
    }
}

// =============================================================================
// CLUSTER D: STATE
// =============================================================================

/// Kind of mutation a state change performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateAction {
    /// Key must not exist yet.
    Create,
    /// Key must already exist.
    Update,
    /// Key must already exist.
    Remove,
}

/// One mutation of the key/value state, emitted by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub action: StateAction,
    pub key: ObjectId,
    pub contract_id: String,
    pub value: Vec<u8>,
}

impl StateChange {
    pub fn new(
        action: StateAction,
        key: ObjectId,
        contract_id: impl Into<String>,
        value: Vec<u8>,
    ) -> Self {
        Self {
            action,
            key,
            contract_id: contract_id.into(),
            value,
        }
    }
}

/// A value stored in the ledger state together with its owning contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub value: Vec<u8>,
    pub contract_id: String,
}

/// Proof that a key is (or is not) present in a state snapshot.
///
/// Verification of the Merkle path belongs to the ledger; consumers only check
/// that the proof is an inclusion proof for the key they asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Key the proof speaks about.
    pub key: ObjectId,
    /// Record at `key`, `None` for an absence proof.
    pub record: Option<StateRecord>,
    /// State root the proof is anchored to.
    pub state_root: Hash,
    /// Block height of the anchoring state.
    pub height: u64,
}

impl InclusionProof {
    /// True if the proof shows `key` present in the state.
    pub fn is_inclusion_match(&self) -> bool {
        self.record.is_some()
    }
}

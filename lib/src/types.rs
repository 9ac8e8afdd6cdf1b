use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// 32-byte hash type
pub type H256 = [u8; 32];

/// 20-byte account address
pub type Address = [u8; 20];

/// How a parent node points at one of its children
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRef {
    /// keccak256 of a child whose encoding is 32 bytes or longer
    Hash(H256),

    /// Raw encoding of a child shorter than 32 bytes, embedded in the parent
    Inline(Vec<u8>),
}

/// MPT node shapes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Empty node
    Empty,

    /// Leaf node: [path nibbles, value]
    Leaf(Vec<u8>, Vec<u8>),

    /// Extension node: [path nibbles, child]
    Extension(Vec<u8>, NodeRef),

    /// Branch node: 16 children + optional value
    Branch([Option<NodeRef>; 16], Option<Vec<u8>>),
}

/// Successful result of walking a proof.
///
/// Absence is a verified statement about the trie, so it lives next to
/// `Found` rather than among the errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofOutcome {
    /// The key is present; holds the raw leaf value
    Found(Vec<u8>),

    /// The proof shows the key is not in the trie
    NotFound,
}

impl ProofOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, ProofOutcome::Found(_))
    }

    pub fn value(&self) -> Option<&[u8]> {
        match self {
            ProofOutcome::Found(value) => Some(value),
            ProofOutcome::NotFound => None,
        }
    }

    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            ProofOutcome::Found(value) => Some(value),
            ProofOutcome::NotFound => None,
        }
    }
}

/// Account record stored in the state trie
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub nonce: u64,
    pub balance: U256,
    pub storage_root: H256,
    pub code_hash: H256,
}

use rlp::{Prototype, Rlp};
use tracing::{debug, trace};

use crate::config::VerifierConfig;
use crate::error::ProofError;
use crate::path::{decode_path, to_nibbles};
use crate::rlp_encoding::{ensure_exact, keccak256, to_h256, EMPTY_TRIE_ROOT};
use crate::types::{Node, NodeRef, ProofOutcome, H256};

/// Decode a raw node encoding into its shape.
pub fn decode_node(raw: &[u8]) -> Result<Node, String> {
    let rlp = Rlp::new(raw);
    ensure_exact(&rlp, raw).map_err(|e| e.to_string())?;

    match rlp.prototype().map_err(|e| e.to_string())? {
        Prototype::Data(0) => Ok(Node::Empty),
        Prototype::List(2) => {
            let encoded_path: Vec<u8> = rlp.val_at(0).map_err(|e| e.to_string())?;
            let (path, is_leaf) = decode_path(&encoded_path)?;
            let second = rlp.at(1).map_err(|e| e.to_string())?;

            if is_leaf {
                let value: Vec<u8> = second.as_val().map_err(|e| e.to_string())?;
                Ok(Node::Leaf(path, value))
            } else {
                match decode_ref(&second)? {
                    Some(child) => Ok(Node::Extension(path, child)),
                    None => Err("extension node without child".into()),
                }
            }
        }
        Prototype::List(17) => {
            let mut children: [Option<NodeRef>; 16] = Default::default();
            for (i, child) in children.iter_mut().enumerate() {
                *child = decode_ref(&rlp.at(i).map_err(|e| e.to_string())?)?;
            }
            let value: Vec<u8> = rlp.val_at(16).map_err(|e| e.to_string())?;
            Ok(Node::Branch(children, (!value.is_empty()).then_some(value)))
        }
        Prototype::List(n) => Err(format!("node is a list of {n} items")),
        _ => Err("node is neither a list nor the empty string".into()),
    }
}

/// Decode a child slot: empty, a 32-byte hash, or an embedded node
fn decode_ref(item: &Rlp<'_>) -> Result<Option<NodeRef>, String> {
    match item.prototype().map_err(|e| e.to_string())? {
        Prototype::Data(0) => Ok(None),
        Prototype::Data(32) => {
            let bytes = item.data().map_err(|e| e.to_string())?;
            to_h256(bytes)
                .map(|hash| Some(NodeRef::Hash(hash)))
                .ok_or_else(|| "child hash is not 32 bytes".into())
        }
        Prototype::List(_) => {
            let raw = item.as_raw();
            if raw.len() >= 32 {
                return Err("embedded child of 32 bytes or more".into());
            }
            Ok(Some(NodeRef::Inline(raw.to_vec())))
        }
        _ => Err("child reference is neither a hash nor an embedded node".into()),
    }
}

/// Get the hash that references a proof node
pub fn hash_node(node_rlp: &[u8]) -> H256 {
    keccak256(node_rlp)
}

enum Step {
    Descend(NodeRef),
    Done(ProofOutcome),
}

/// Walks Merkle Patricia Trie proofs from a trusted root.
#[derive(Clone, Debug, Default)]
pub struct ProofVerifier {
    config: VerifierConfig,
}

impl ProofVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify a Merkle Patricia Trie proof
    ///
    /// # Arguments
    /// * `root` - The trusted root hash of the trie
    /// * `key` - The trie key, consumed one nibble at a time
    /// * `proof` - RLP-encoded nodes from root to terminal node
    ///
    /// # Returns
    /// * `Found(value)` when the key is in the trie
    /// * `NotFound` when the proof shows the key is absent
    /// * an error when the proof does not hold against `root`
    pub fn verify(
        &self,
        root: &H256,
        key: &[u8],
        proof: &[Vec<u8>],
    ) -> Result<ProofOutcome, ProofError> {
        if proof.len() > self.config.max_proof_nodes {
            return Err(ProofError::ProofTooLong {
                len: proof.len(),
                max: self.config.max_proof_nodes,
            });
        }

        debug!(
            root = %hex::encode(root),
            key = %hex::encode(key),
            nodes = proof.len(),
            "verifying trie proof"
        );

        if proof.is_empty() {
            return if *root == EMPTY_TRIE_ROOT {
                Ok(ProofOutcome::NotFound)
            } else {
                Err(ProofError::KeyMismatch { index: 0 })
            };
        }

        let nibbles = to_nibbles(key);
        let mut remaining = &nibbles[..];
        let mut expected_hash = *root;

        for (index, node_rlp) in proof.iter().enumerate() {
            let found = hash_node(node_rlp);
            if found != expected_hash {
                return Err(ProofError::ProofHashMismatch {
                    index,
                    expected: expected_hash,
                    found,
                });
            }

            let mut node = decode_node(node_rlp)
                .map_err(|reason| ProofError::MalformedNode { index, reason })?;

            // Embedded children are walked in place without consuming a proof entry.
            loop {
                match step(node, &mut remaining, index)? {
                    Step::Done(outcome) => {
                        if index + 1 != proof.len() {
                            return Err(ProofError::MalformedNode {
                                index: index + 1,
                                reason: "proof continues past a terminal node".into(),
                            });
                        }
                        trace!(index, found = outcome.is_found(), "reached terminal node");
                        return Ok(outcome);
                    }
                    Step::Descend(NodeRef::Hash(hash)) => {
                        expected_hash = hash;
                        break;
                    }
                    Step::Descend(NodeRef::Inline(raw)) => {
                        node = decode_node(&raw)
                            .map_err(|reason| ProofError::MalformedNode { index, reason })?;
                    }
                }
            }
        }

        // Ran out of nodes while the last one still pointed further down.
        Err(ProofError::KeyMismatch { index: proof.len() })
    }
}

fn step(node: Node, remaining: &mut &[u8], index: usize) -> Result<Step, ProofError> {
    let current: &[u8] = *remaining;
    match node {
        Node::Empty => Ok(Step::Done(ProofOutcome::NotFound)),
        Node::Leaf(path, value) => {
            if path.len() != current.len() {
                return Err(ProofError::KeyMismatch { index });
            }
            let outcome = if path == current {
                ProofOutcome::Found(value)
            } else {
                // A leaf for a different key sits where ours would be.
                ProofOutcome::NotFound
            };
            *remaining = &[];
            Ok(Step::Done(outcome))
        }
        Node::Extension(path, child) => {
            if !current.starts_with(&path) {
                return Ok(Step::Done(ProofOutcome::NotFound));
            }
            *remaining = &current[path.len()..];
            Ok(Step::Descend(child))
        }
        Node::Branch(mut children, value) => match current.split_first() {
            None => Ok(Step::Done(value.map_or(ProofOutcome::NotFound, ProofOutcome::Found))),
            Some((&nibble, rest)) => {
                *remaining = rest;
                match children[nibble as usize].take() {
                    Some(child) => Ok(Step::Descend(child)),
                    None => Ok(Step::Done(ProofOutcome::NotFound)),
                }
            }
        },
    }
}

/// Verify a proof with the default limits
pub fn verify_proof(
    root: &H256,
    key: &[u8],
    proof: &[Vec<u8>],
) -> Result<ProofOutcome, ProofError> {
    ProofVerifier::default().verify(root, key, proof)
}

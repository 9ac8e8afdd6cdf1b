use rlp::DecoderError;
use thiserror::Error;

use crate::types::H256;

fn fmt_hash(hash: &H256) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Errors raised while binding headers or verifying proofs
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("block header hash {} does not match claimed block hash {}", fmt_hash(.computed), fmt_hash(.expected))]
    HeaderMismatch { expected: H256, computed: H256 },

    #[error("malformed block header: {0}")]
    MalformedHeader(String),

    #[error("proof node {index} hashes to {}, expected {}", fmt_hash(.found), fmt_hash(.expected))]
    ProofHashMismatch {
        index: usize,
        expected: H256,
        found: H256,
    },

    #[error("malformed proof node {index}: {reason}")]
    MalformedNode { index: usize, reason: String },

    #[error("key path does not match proof at node {index}")]
    KeyMismatch { index: usize },

    #[error("malformed account record: {0}")]
    MalformedAccount(String),

    #[error("malformed storage value: {0}")]
    MalformedValue(String),

    #[error("proof has {len} nodes, limit is {max}")]
    ProofTooLong { len: usize, max: usize },

    #[error("RLP decode error: {0}")]
    Rlp(#[from] DecoderError),
}

//! Trustless verification of account and storage values.
//!
//! A block header is bound to its claimed hash to obtain a state root, and
//! Merkle Patricia Trie proofs are walked from that root to an account record
//! and from the account's storage root to a slot value.

use alloy_sol_types::sol;

pub mod types;
pub mod error;
pub mod config;
pub mod rlp_encoding;
pub mod path;
pub mod mpt;
pub mod account;
pub mod storage;
pub mod header;
pub mod proof;
pub mod source;
pub mod prover;

#[cfg(test)]
mod test_utils;

pub use types::*;
pub use error::*;
pub use config::*;
pub use rlp_encoding::*;
pub use path::*;
pub use mpt::*;
pub use account::*;
pub use storage::*;
pub use header::*;
pub use proof::*;
pub use source::*;
pub use prover::*;

sol! {
    /// Proof artifacts as consumed by an on-chain storage proof verifier.
    struct StorageProofArtifacts {
        uint64 blockNumber;
        bytes32 blockHash;
        bytes blockHeaderRLP;
        bytes accountProofRLP;
        bytes[] storageProofsRLP;
    }
}

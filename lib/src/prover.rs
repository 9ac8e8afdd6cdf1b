use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolType;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ProverConfig;
use crate::error::ProofError;
use crate::header::bind_header;
use crate::mpt::ProofVerifier;
use crate::proof::encode_proof;
use crate::source::{AccountProofResponse, BlockTag, FetchError, ProofSource};
use crate::types::{Account, Address, H256};
use crate::StorageProofArtifacts;

#[derive(Debug, Error)]
pub enum ProverError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error(
        "account proof for 0x{} does not match the fetched account: proven {proven:?}, fetched {fetched:?}",
        hex::encode(.address)
    )]
    AccountMismatch {
        address: Address,
        proven: Option<Account>,
        fetched: Account,
    },

    #[error("storage proofs failed at indices {indices:?}")]
    StorageProofsFailed { indices: Vec<usize> },

    #[error("source returned {got} storage proofs for {requested} keys")]
    StorageProofCount { requested: usize, got: usize },
}

/// Encoded artifacts for downstream verifiers, bound to one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBundle {
    pub block_number: u64,
    pub block_hash: B256,
    pub state_root: B256,
    pub storage_hash: B256,
    #[serde(rename = "blockHeaderRLP")]
    pub block_header_rlp: Bytes,
    #[serde(rename = "accountProofRLP")]
    pub account_proof_rlp: Bytes,
    #[serde(rename = "storageProofsRLP")]
    pub storage_proofs_rlp: Vec<Bytes>,
}

impl ProofBundle {
    /// Solidity ABI encoding of the artifacts
    pub fn abi_encode(&self) -> Vec<u8> {
        StorageProofArtifacts::abi_encode(&StorageProofArtifacts {
            blockNumber: self.block_number,
            blockHash: self.block_hash,
            blockHeaderRLP: self.block_header_rlp.clone(),
            accountProofRLP: self.account_proof_rlp.clone(),
            storageProofsRLP: self.storage_proofs_rlp.clone(),
        })
    }
}

/// Fetches account and storage proofs, checks them, and packages them.
pub struct StorageProver<S> {
    source: S,
    config: ProverConfig,
    verifier: ProofVerifier,
}

impl<S: ProofSource> StorageProver<S> {
    pub fn new(source: S, config: ProverConfig) -> Self {
        let verifier = ProofVerifier::new(config.verifier.clone());
        Self {
            source,
            config,
            verifier,
        }
    }

    /// Build a bundle for `address` and `storage_keys` at `block`.
    ///
    /// The header is always bound to its block hash; the proofs themselves are
    /// checked only when `config.verify` is set.
    pub async fn get_proof(
        &self,
        address: Address,
        storage_keys: &[H256],
        block: BlockTag,
    ) -> Result<ProofBundle, ProverError> {
        // Pin the block first so both fetches agree on the height.
        let block = self.source.get_block(block).await?;
        let state_root = bind_header(&block.header, &block.hash)?;
        let number = block.header.number;

        let proof = self
            .source
            .get_proof(address, storage_keys, BlockTag::Number(number))
            .await?;
        if proof.storage_proof.len() != storage_keys.len() {
            return Err(ProverError::StorageProofCount {
                requested: storage_keys.len(),
                got: proof.storage_proof.len(),
            });
        }

        if self.config.verify {
            self.verify_account(&state_root, &address, &proof)?;
            self.verify_storage_proofs(storage_keys, &proof)?;
        }

        let bundle = ProofBundle {
            block_number: number,
            block_hash: B256::from(block.hash),
            state_root: B256::from(state_root),
            storage_hash: B256::from(proof.storage_hash),
            block_header_rlp: Bytes::from(block.header.encode()),
            account_proof_rlp: Bytes::from(encode_proof(&proof.account_proof)),
            storage_proofs_rlp: proof
                .storage_proof
                .iter()
                .map(|p| Bytes::from(encode_proof(&p.proof)))
                .collect(),
        };

        info!(
            block = number,
            address = %hex::encode(address),
            slots = storage_keys.len(),
            verified = self.config.verify,
            "assembled storage proof bundle"
        );
        Ok(bundle)
    }

    fn verify_account(
        &self,
        state_root: &H256,
        address: &Address,
        proof: &AccountProofResponse,
    ) -> Result<(), ProverError> {
        let fetched = Account {
            nonce: proof.nonce,
            balance: proof.balance,
            storage_root: proof.storage_hash,
            code_hash: proof.code_hash,
        };

        let proven = self
            .verifier
            .verify_account(state_root, address, &proof.account_proof)?;
        let matches = match &proven {
            Some(proven) => *proven == fetched,
            // Absent from the state trie: only an empty account is consistent.
            None => fetched.is_empty(),
        };
        if !matches {
            warn!(address = %hex::encode(address), "account proof does not match fetched fields");
            return Err(ProverError::AccountMismatch {
                address: *address,
                proven,
                fetched,
            });
        }
        Ok(())
    }

    /// Proofs are checked against the requested keys, not the keys echoed by the source.
    fn verify_storage_proofs(
        &self,
        storage_keys: &[H256],
        proof: &AccountProofResponse,
    ) -> Result<(), ProverError> {
        let failed: Vec<usize> = storage_keys
            .iter()
            .zip(&proof.storage_proof)
            .enumerate()
            .filter_map(|(index, (key, entry))| {
                if entry.key != *key {
                    warn!(
                        index,
                        requested = %hex::encode(key),
                        returned = %hex::encode(entry.key),
                        "storage proof is for a different slot"
                    );
                    return Some(index);
                }
                match self
                    .verifier
                    .verify_storage(&proof.storage_hash, key, &entry.proof)
                {
                    Ok(value) if value.unwrap_or_default() == entry.value => None,
                    Ok(value) => {
                        warn!(index, proven = ?value, fetched = %entry.value, "storage value mismatch");
                        Some(index)
                    }
                    Err(err) => {
                        warn!(index, error = %err, "storage proof failed");
                        Some(index)
                    }
                }
            })
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(ProverError::StorageProofsFailed { indices: failed })
        }
    }
}

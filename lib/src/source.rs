//! Boundary to whatever fetches raw proofs and headers (usually a JSON-RPC node).

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::header::BlockHeader;
use crate::types::{Address, H256};

/// Block selector for fetches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Latest => write!(f, "latest"),
            BlockTag::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid block tag: {0}")]
pub struct InvalidBlockTag(pub String);

impl FromStr for BlockTag {
    type Err = InvalidBlockTag;

    /// Accepts `latest`, a decimal number or a `0x`-prefixed hex number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("latest") {
            return Ok(BlockTag::Latest);
        }
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed
            .map(BlockTag::Number)
            .map_err(|_| InvalidBlockTag(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("block {0} not found")]
    BlockNotFound(BlockTag),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One requested slot and its proof against the account's storage root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageProofResponse {
    pub key: H256,
    pub value: U256,
    pub proof: Vec<Vec<u8>>,
}

/// Account fields and proofs as returned by `eth_getProof`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountProofResponse {
    pub account_proof: Vec<Vec<u8>>,
    pub balance: U256,
    pub code_hash: H256,
    pub nonce: u64,
    pub storage_hash: H256,
    pub storage_proof: Vec<StorageProofResponse>,
}

/// Header fields of a block plus the hash the source claims for it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockResponse {
    pub hash: H256,
    pub header: BlockHeader,
}

/// Fetch capability handed to [`crate::StorageProver`].
///
/// Nothing returned here is trusted: headers are bound to their hash and
/// proofs are checked against the bound root.
#[async_trait]
pub trait ProofSource: Send + Sync {
    async fn get_proof(
        &self,
        address: Address,
        storage_keys: &[H256],
        block: BlockTag,
    ) -> Result<AccountProofResponse, FetchError>;

    async fn get_block(&self, block: BlockTag) -> Result<BlockResponse, FetchError>;
}

use std::marker::PhantomData;

use alloy::primitives::{Address as RpcAddress, B256, U256 as RpcU256};
use alloy::providers::Provider;
use alloy::rpc::types::{BlockId, BlockNumberOrTag};
use alloy::transports::Transport;
use async_trait::async_trait;
use primitive_types::U256;
use storage_proofs_lib::{
    AccountProofResponse, Address, BlockHeader, BlockResponse, BlockTag, FetchError, ProofSource,
    StorageProofResponse, H256,
};
use tracing::{debug, warn};

/// [`ProofSource`] backed by an alloy provider (`eth_getProof`, `eth_getBlockByNumber`).
pub struct RpcProofSource<P, T> {
    provider: P,
    _transport: PhantomData<fn() -> T>,
}

impl<P, T> RpcProofSource<P, T>
where
    P: Provider<T>,
    T: Transport + Clone,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _transport: PhantomData,
        }
    }
}

fn number_or_tag(block: BlockTag) -> BlockNumberOrTag {
    match block {
        BlockTag::Latest => BlockNumberOrTag::Latest,
        BlockTag::Number(n) => BlockNumberOrTag::Number(n),
    }
}

fn to_u256(value: RpcU256) -> U256 {
    U256::from_big_endian(&value.to_be_bytes::<32>())
}

fn narrow<V: TryInto<u64>>(value: V, field: &str) -> Result<u64, FetchError> {
    value
        .try_into()
        .map_err(|_| FetchError::InvalidResponse(format!("{field} does not fit in 64 bits")))
}

/// A post-Cancun header that no longer hashes to its block hash most likely carries
/// a requests hash, which this client cannot read back.
fn requests_hash_unrecoverable(header: &BlockHeader, hash: &H256) -> bool {
    header.parent_beacon_block_root.is_some()
        && header.requests_hash.is_none()
        && header.hash() != *hash
}

#[async_trait]
impl<P, T> ProofSource for RpcProofSource<P, T>
where
    P: Provider<T> + Send + Sync,
    T: Transport + Clone,
{
    async fn get_proof(
        &self,
        address: Address,
        storage_keys: &[H256],
        block: BlockTag,
    ) -> Result<AccountProofResponse, FetchError> {
        debug!(address = %hex::encode(address), keys = storage_keys.len(), %block, "eth_getProof");
        let keys: Vec<B256> = storage_keys.iter().map(|k| B256::from(*k)).collect();
        let response = self
            .provider
            .get_proof(RpcAddress::from(address), keys)
            .block_id(BlockId::Number(number_or_tag(block)))
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if response.storage_proof.len() != storage_keys.len() {
            return Err(FetchError::InvalidResponse(format!(
                "{} storage proofs for {} keys",
                response.storage_proof.len(),
                storage_keys.len()
            )));
        }

        // Proofs come back in request order.
        let storage_proof = storage_keys
            .iter()
            .zip(&response.storage_proof)
            .map(|(key, p)| StorageProofResponse {
                key: *key,
                value: to_u256(p.value),
                proof: p.proof.iter().map(|node| node.to_vec()).collect(),
            })
            .collect();

        Ok(AccountProofResponse {
            account_proof: response.account_proof.iter().map(|node| node.to_vec()).collect(),
            balance: to_u256(response.balance),
            code_hash: response.code_hash.0,
            nonce: narrow(response.nonce, "nonce")?,
            storage_hash: response.storage_hash.0,
            storage_proof,
        })
    }

    async fn get_block(&self, block: BlockTag) -> Result<BlockResponse, FetchError> {
        debug!(%block, "eth_getBlockByNumber");
        let fetched = self
            .provider
            .get_block_by_number(number_or_tag(block), false)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .ok_or(FetchError::BlockNotFound(block))?;

        let h = fetched.header;
        let hash = h
            .hash
            .ok_or_else(|| FetchError::InvalidResponse("block has no hash".into()))?;
        let number = h
            .number
            .ok_or_else(|| FetchError::InvalidResponse("block has no number".into()))?;

        let header = BlockHeader {
            parent_hash: h.parent_hash.0,
            uncles_hash: h.uncles_hash.0,
            coinbase: h.miner.0 .0,
            state_root: h.state_root.0,
            transactions_root: h.transactions_root.0,
            receipts_root: h.receipts_root.0,
            logs_bloom: h.logs_bloom.0 .0,
            difficulty: to_u256(h.difficulty),
            number,
            gas_limit: narrow(h.gas_limit, "gas limit")?,
            gas_used: narrow(h.gas_used, "gas used")?,
            timestamp: narrow(h.timestamp, "timestamp")?,
            extra_data: h.extra_data.to_vec(),
            mix_hash: h.mix_hash.unwrap_or_default().0,
            nonce: h.nonce.unwrap_or_default().0,
            base_fee: h.base_fee_per_gas.map(U256::from),
            withdrawals_root: h.withdrawals_root.map(|root| root.0),
            blob_gas_used: h.blob_gas_used.map(|g| narrow(g, "blob gas used")).transpose()?,
            excess_blob_gas: h
                .excess_blob_gas
                .map(|g| narrow(g, "excess blob gas"))
                .transpose()?,
            parent_beacon_block_root: h.parent_beacon_block_root.map(|root| root.0),
            requests_hash: None,
        };

        if requests_hash_unrecoverable(&header, &hash.0) {
            warn!(
                block = number,
                "header does not hash to the block hash; the node likely serves a requests hash this client cannot read"
            );
        }

        Ok(BlockResponse {
            hash: hash.0,
            header,
        })
    }
}

use primitive_types::U256;
use rlp::{Prototype, Rlp, RlpStream};
use tracing::debug;

use crate::error::ProofError;
use crate::rlp_encoding::{append_bytes, ensure_exact, keccak256, to_h256, to_minimal_be};
use crate::types::{Address, H256};

/// Position of the state root in the header field list
const STATE_ROOT_INDEX: usize = 3;

/// Fields of a block header, in canonical order.
///
/// Trailing optional fields belong to later forks and are encoded only when
/// present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub parent_hash: H256,
    pub uncles_hash: H256,
    pub coinbase: Address,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: [u8; 256],
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub mix_hash: H256,
    pub nonce: [u8; 8],
    pub base_fee: Option<U256>,
    pub withdrawals_root: Option<H256>,
    pub blob_gas_used: Option<u64>,
    pub excess_blob_gas: Option<u64>,
    pub parent_beacon_block_root: Option<H256>,
    pub requests_hash: Option<H256>,
}

impl BlockHeader {
    /// Canonical RLP encoding; numbers are minimal big-endian strings.
    pub fn encode(&self) -> Vec<u8> {
        let number = |n: u64| to_minimal_be(U256::from(n));

        let mut fields: Vec<Vec<u8>> = vec![
            self.parent_hash.to_vec(),
            self.uncles_hash.to_vec(),
            self.coinbase.to_vec(),
            self.state_root.to_vec(),
            self.transactions_root.to_vec(),
            self.receipts_root.to_vec(),
            self.logs_bloom.to_vec(),
            to_minimal_be(self.difficulty),
            number(self.number),
            number(self.gas_limit),
            number(self.gas_used),
            number(self.timestamp),
            self.extra_data.clone(),
            self.mix_hash.to_vec(),
            self.nonce.to_vec(),
        ];
        fields.extend(self.base_fee.map(to_minimal_be));
        fields.extend(self.withdrawals_root.map(|h| h.to_vec()));
        fields.extend(self.blob_gas_used.map(number));
        fields.extend(self.excess_blob_gas.map(number));
        fields.extend(self.parent_beacon_block_root.map(|h| h.to_vec()));
        fields.extend(self.requests_hash.map(|h| h.to_vec()));

        let mut stream = RlpStream::new_list(fields.len());
        for field in &fields {
            append_bytes(&mut stream, field);
        }
        stream.out().to_vec()
    }

    pub fn hash(&self) -> H256 {
        keccak256(&self.encode())
    }
}

/// Check that `header` hashes to `claimed_block_hash` and return its state root.
pub fn bind_header(header: &BlockHeader, claimed_block_hash: &H256) -> Result<H256, ProofError> {
    let computed = header.hash();
    if computed != *claimed_block_hash {
        return Err(ProofError::HeaderMismatch {
            expected: *claimed_block_hash,
            computed,
        });
    }
    debug!(
        number = header.number,
        hash = %hex::encode(computed),
        "bound block header"
    );
    Ok(header.state_root)
}

/// Bind an already encoded header and read its state root.
pub fn state_root_from_rlp(header_rlp: &[u8], claimed_block_hash: &H256) -> Result<H256, ProofError> {
    let computed = keccak256(header_rlp);
    if computed != *claimed_block_hash {
        return Err(ProofError::HeaderMismatch {
            expected: *claimed_block_hash,
            computed,
        });
    }

    let rlp = Rlp::new(header_rlp);
    ensure_exact(&rlp, header_rlp)?;
    match rlp.prototype()? {
        Prototype::List(n) if n >= 15 => {}
        _ => return Err(ProofError::MalformedHeader("expected a list of at least 15 fields".into())),
    }
    let state_root = rlp.at(STATE_ROOT_INDEX)?;
    to_h256(state_root.data()?)
        .ok_or_else(|| ProofError::MalformedHeader("state root is not 32 bytes".into()))
}

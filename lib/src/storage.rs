use primitive_types::U256;

use crate::error::ProofError;
use crate::mpt::ProofVerifier;
use crate::rlp_encoding::{decode_bytes, encode_bytes, from_minimal_be, keccak256, to_minimal_be};
use crate::types::{Address, H256};

/// Storage slot of `holder` in a `mapping(address => _)` declared at `mapping_slot`:
/// keccak256(pad32(holder) ++ pad32(mapping_slot))
pub fn slot_key(holder: &Address, mapping_slot: U256) -> H256 {
    let mut preimage = [0u8; 64];
    preimage[12..32].copy_from_slice(holder);
    mapping_slot.to_big_endian(&mut preimage[32..]);
    keccak256(&preimage)
}

/// Same as [`slot_key`] for the common case of a small declaration index
pub fn balance_slot(holder: &Address, mapping_slot: u64) -> H256 {
    slot_key(holder, U256::from(mapping_slot))
}

/// Path of a storage slot in the account's storage trie
pub fn storage_trie_key(slot: &H256) -> H256 {
    keccak256(slot)
}

/// Path of an account in the state trie
pub fn account_trie_key(address: &Address) -> H256 {
    keccak256(address)
}

/// Leaf value stored for a slot: the RLP string of its minimal big-endian form
pub fn encode_storage_value(value: U256) -> Vec<u8> {
    encode_bytes(&to_minimal_be(value))
}

pub fn decode_storage_value(bytes: &[u8]) -> Result<U256, ProofError> {
    let raw = decode_bytes(bytes).map_err(|e| ProofError::MalformedValue(e.to_string()))?;
    from_minimal_be(&raw).map_err(|e| ProofError::MalformedValue(e.to_string()))
}

impl ProofVerifier {
    /// Verify a storage slot against an account's storage root.
    ///
    /// `None` means the slot has never been written; callers usually read that as zero.
    pub fn verify_storage(
        &self,
        storage_root: &H256,
        slot: &H256,
        proof: &[Vec<u8>],
    ) -> Result<Option<U256>, ProofError> {
        let key = storage_trie_key(slot);
        self.verify(storage_root, &key, proof)?
            .into_value()
            .map(|bytes| decode_storage_value(&bytes))
            .transpose()
    }
}

use primitive_types::U256;
use rlp::{Rlp, RlpStream};
use sha3::{Digest, Keccak256};

use crate::types::H256;

/// Root hash of a trie with no entries: keccak256(rlp(""))
pub const EMPTY_TRIE_ROOT: H256 = [
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
];

/// Code hash of an account without code: keccak256("")
pub const EMPTY_CODE_HASH: H256 = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// Compute Keccak256 hash
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Minimal big-endian form of an integer. Zero becomes the empty string.
pub fn to_minimal_be(value: U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    let skip = buf.iter().take_while(|b| **b == 0).count();
    buf[skip..].to_vec()
}

/// Parse a minimal big-endian integer of at most 32 bytes.
pub fn from_minimal_be(bytes: &[u8]) -> Result<U256, &'static str> {
    if bytes.len() > 32 {
        return Err("integer wider than 256 bits");
    }
    if bytes.first() == Some(&0) {
        return Err("integer has a leading zero byte");
    }
    Ok(U256::from_big_endian(bytes))
}

/// Append a byte string item to an RLP stream
pub fn append_bytes(stream: &mut RlpStream, data: &[u8]) {
    stream.append(&data.to_vec());
}

/// Encode a single byte string
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    rlp::encode(&data.to_vec()).to_vec()
}

/// Decode a single byte string, rejecting lists and trailing bytes
pub fn decode_bytes(data: &[u8]) -> Result<Vec<u8>, rlp::DecoderError> {
    let rlp = Rlp::new(data);
    ensure_exact(&rlp, data)?;
    rlp.as_val()
}

/// Fail unless `rlp` spans all of `data`
pub(crate) fn ensure_exact(rlp: &Rlp<'_>, data: &[u8]) -> Result<(), rlp::DecoderError> {
    if rlp.payload_info()?.total() != data.len() {
        return Err(rlp::DecoderError::RlpInconsistentLengthAndData);
    }
    Ok(())
}

/// Copy a 32-byte string into a hash
pub(crate) fn to_h256(bytes: &[u8]) -> Option<H256> {
    bytes.try_into().ok()
}

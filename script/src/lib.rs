//! JSON-RPC fetch client and CLI helpers for the `storage-proofs` binary.

pub mod rpc;

use storage_proofs_lib::{Address, H256};

pub use rpc::RpcProofSource;

fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], hex::FromHexError> {
    let mut out = [0u8; N];
    hex::decode_to_slice(input.strip_prefix("0x").unwrap_or(input), &mut out)?;
    Ok(out)
}

/// Parse a `0x`-prefixed 20-byte address
pub fn parse_address(input: &str) -> Result<Address, hex::FromHexError> {
    decode_fixed(input)
}

/// Parse a `0x`-prefixed 32-byte hash or storage slot
pub fn parse_hash(input: &str) -> Result<H256, hex::FromHexError> {
    decode_fixed(input)
}

use rlp::{Prototype, Rlp, RlpStream};

use crate::error::ProofError;
use crate::rlp_encoding::ensure_exact;

/// Package an ordered node list as one RLP list.
///
/// Nodes are already RLP items and are embedded as-is; nothing is verified here.
pub fn encode_proof(nodes: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(nodes.len());
    for node in nodes {
        stream.append_raw(node, 1);
    }
    stream.out().to_vec()
}

/// Unpack a blob produced by [`encode_proof`] back into raw nodes
pub fn decode_proof(blob: &[u8]) -> Result<Vec<Vec<u8>>, ProofError> {
    let rlp = Rlp::new(blob);
    ensure_exact(&rlp, blob)?;
    let count = match rlp.prototype()? {
        Prototype::List(count) => count,
        _ => return Err(rlp::DecoderError::RlpExpectedToBeList.into()),
    };

    (0..count)
        .map(|i| -> Result<Vec<u8>, ProofError> { Ok(rlp.at(i)?.as_raw().to_vec()) })
        .collect()
}

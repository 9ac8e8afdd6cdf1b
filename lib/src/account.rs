use primitive_types::U256;
use rlp::{Prototype, Rlp, RlpStream};

use crate::error::ProofError;
use crate::mpt::ProofVerifier;
use crate::rlp_encoding::{
    append_bytes, ensure_exact, from_minimal_be, to_h256, to_minimal_be, EMPTY_CODE_HASH,
    EMPTY_TRIE_ROOT,
};
use crate::storage::account_trie_key;
use crate::types::{Account, Address, H256};

impl Account {
    /// The record a never-touched address would have
    pub fn empty() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            storage_root: EMPTY_TRIE_ROOT,
            code_hash: EMPTY_CODE_HASH,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

/// Encode an account as [nonce, balance, storageRoot, codeHash].
///
/// A zero balance is written as the empty string.
pub fn encode_account(account: &Account) -> Vec<u8> {
    let mut stream = RlpStream::new_list(4);
    stream.append(&account.nonce);
    append_bytes(&mut stream, &to_minimal_be(account.balance));
    append_bytes(&mut stream, &account.storage_root);
    append_bytes(&mut stream, &account.code_hash);
    stream.out().to_vec()
}

pub fn decode_account(bytes: &[u8]) -> Result<Account, ProofError> {
    let malformed = |e: rlp::DecoderError| ProofError::MalformedAccount(e.to_string());

    let rlp = Rlp::new(bytes);
    ensure_exact(&rlp, bytes).map_err(malformed)?;
    match rlp.prototype().map_err(malformed)? {
        Prototype::List(4) => {}
        Prototype::List(n) => {
            return Err(ProofError::MalformedAccount(format!(
                "expected 4 elements, found {n}"
            )))
        }
        _ => return Err(ProofError::MalformedAccount("record is not a list".into())),
    }

    let nonce: u64 = rlp.val_at(0).map_err(malformed)?;
    let balance = rlp.at(1).and_then(|item| item.data().map(from_minimal_be)).map_err(malformed)?;
    let balance = balance.map_err(|e| ProofError::MalformedAccount(format!("balance: {e}")))?;

    let hash_at = |index: usize, name: &str| -> Result<H256, ProofError> {
        let bytes = rlp.at(index).and_then(|item| item.data().map(to_h256)).map_err(malformed)?;
        bytes.ok_or_else(|| ProofError::MalformedAccount(format!("{name} is not 32 bytes")))
    };

    Ok(Account {
        nonce,
        balance,
        storage_root: hash_at(2, "storage root")?,
        code_hash: hash_at(3, "code hash")?,
    })
}

impl ProofVerifier {
    /// Verify an account against a state root.
    ///
    /// `None` means the proof shows the address has no record.
    pub fn verify_account(
        &self,
        state_root: &H256,
        address: &Address,
        proof: &[Vec<u8>],
    ) -> Result<Option<Account>, ProofError> {
        let key = account_trie_key(address);
        self.verify(state_root, &key, proof)?
            .into_value()
            .map(|bytes| decode_account(&bytes))
            .transpose()
    }
}

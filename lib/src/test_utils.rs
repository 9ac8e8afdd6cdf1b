//! Test fixtures: an in-memory trie producing genuine proofs, and blocks built on it.

use std::collections::HashMap;

use primitive_types::U256;
use rlp::RlpStream;

use crate::account::encode_account;
use crate::header::BlockHeader;
use crate::path::{encode_path, to_nibbles};
use crate::rlp_encoding::{append_bytes, keccak256, EMPTY_CODE_HASH, EMPTY_TRIE_ROOT};
use crate::source::{AccountProofResponse, BlockResponse, StorageProofResponse};
use crate::storage::{account_trie_key, encode_storage_value, storage_trie_key};
use crate::types::{Account, Address, H256};

#[derive(Clone, Debug, Default)]
enum TrieNode {
    #[default]
    Empty,
    Leaf(Vec<u8>, Vec<u8>),
    Extension(Vec<u8>, Box<TrieNode>),
    Branch(Box<[TrieNode; 16]>, Option<Vec<u8>>),
}

/// Canonical Ethereum trie: children under 32 bytes are embedded in their parent.
#[derive(Clone, Debug, Default)]
pub struct TestTrie {
    root: TrieNode,
}

impl TestTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &[u8], value: &[u8]) {
        let root = std::mem::take(&mut self.root);
        self.root = insert_at(root, &to_nibbles(key), value.to_vec());
    }

    pub fn root_hash(&self) -> H256 {
        keccak256(&encode(&self.root))
    }

    /// Collect the root and every hash-referenced node along the key's path
    pub fn proof(&self, key: &[u8]) -> Vec<Vec<u8>> {
        let nibbles = to_nibbles(key);
        let mut remaining = &nibbles[..];
        let mut node = &self.root;
        let mut proof = Vec::new();
        let mut is_root = true;

        loop {
            let raw = encode(node);
            if is_root || raw.len() >= 32 {
                proof.push(raw);
            }
            is_root = false;

            match node {
                TrieNode::Empty | TrieNode::Leaf(..) => return proof,
                TrieNode::Extension(path, child) => {
                    if !remaining.starts_with(path) {
                        return proof;
                    }
                    remaining = &remaining[path.len()..];
                    node = child.as_ref();
                }
                TrieNode::Branch(children, _) => match remaining.split_first() {
                    None => return proof,
                    Some((&nibble, rest)) => {
                        let child = &children[nibble as usize];
                        if matches!(child, TrieNode::Empty) {
                            return proof;
                        }
                        remaining = rest;
                        node = child;
                    }
                },
            }
        }
    }
}

fn insert_at(node: TrieNode, path: &[u8], value: Vec<u8>) -> TrieNode {
    match node {
        TrieNode::Empty => TrieNode::Leaf(path.to_vec(), value),
        TrieNode::Leaf(leaf_path, leaf_value) => {
            let common_len = common_prefix_len(&leaf_path, path);
            if common_len == leaf_path.len() && common_len == path.len() {
                return TrieNode::Leaf(leaf_path, value);
            }
            let branch = TrieNode::Branch(Box::default(), None);
            let branch = insert_at(branch, &leaf_path[common_len..], leaf_value);
            let branch = insert_at(branch, &path[common_len..], value);
            with_prefix(&path[..common_len], branch)
        }
        TrieNode::Extension(ext_path, child) => {
            let common_len = common_prefix_len(&ext_path, path);
            if common_len == ext_path.len() {
                let child = insert_at(*child, &path[common_len..], value);
                return TrieNode::Extension(ext_path, Box::new(child));
            }

            // Split the extension at the first differing nibble
            let mut children: Box<[TrieNode; 16]> = Box::default();
            let rest = &ext_path[common_len + 1..];
            children[ext_path[common_len] as usize] = if rest.is_empty() {
                *child
            } else {
                TrieNode::Extension(rest.to_vec(), child)
            };
            let branch = insert_at(TrieNode::Branch(children, None), &path[common_len..], value);
            with_prefix(&path[..common_len], branch)
        }
        TrieNode::Branch(mut children, branch_value) => match path.split_first() {
            None => TrieNode::Branch(children, Some(value)),
            Some((&nibble, rest)) => {
                let slot = &mut children[nibble as usize];
                *slot = insert_at(std::mem::take(slot), rest, value);
                TrieNode::Branch(children, branch_value)
            }
        },
    }
}

fn with_prefix(prefix: &[u8], node: TrieNode) -> TrieNode {
    if prefix.is_empty() {
        node
    } else {
        TrieNode::Extension(prefix.to_vec(), Box::new(node))
    }
}

fn encode(node: &TrieNode) -> Vec<u8> {
    match node {
        TrieNode::Empty => vec![0x80],
        TrieNode::Leaf(path, value) => {
            let mut stream = RlpStream::new_list(2);
            append_bytes(&mut stream, &encode_path(path, true));
            append_bytes(&mut stream, value);
            stream.out().to_vec()
        }
        TrieNode::Extension(path, child) => {
            let mut stream = RlpStream::new_list(2);
            append_bytes(&mut stream, &encode_path(path, false));
            append_child(&mut stream, child);
            stream.out().to_vec()
        }
        TrieNode::Branch(children, value) => {
            let mut stream = RlpStream::new_list(17);
            for child in children.iter() {
                if matches!(child, TrieNode::Empty) {
                    append_bytes(&mut stream, &[]);
                } else {
                    append_child(&mut stream, child);
                }
            }
            append_bytes(&mut stream, value.as_deref().unwrap_or_default());
            stream.out().to_vec()
        }
    }
}

fn append_child(stream: &mut RlpStream, child: &TrieNode) {
    let raw = encode(child);
    if raw.len() < 32 {
        stream.append_raw(&raw, 1);
    } else {
        append_bytes(stream, &keccak256(&raw));
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// A block whose state holds one contract with the given storage, plus a few
/// externally owned accounts so the account proof spans several nodes.
pub struct TestBlock {
    pub header: BlockHeader,
    pub hash: H256,
    pub contract: Address,
    pub account: Account,
    state: TestTrie,
    storage: TestTrie,
    values: HashMap<H256, U256>,
}

impl TestBlock {
    pub fn new(number: u64, contract: Address, slots: &[(H256, U256)]) -> Self {
        let mut storage = TestTrie::new();
        let mut values = HashMap::new();
        for (slot, value) in slots {
            if !value.is_zero() {
                storage.insert(&storage_trie_key(slot), &encode_storage_value(*value));
                values.insert(*slot, *value);
            }
        }

        let account = Account {
            nonce: 1,
            balance: U256::zero(),
            storage_root: storage.root_hash(),
            code_hash: keccak256(b"contract code"),
        };

        let mut state = TestTrie::new();
        state.insert(&account_trie_key(&contract), &encode_account(&account));
        for i in 1..=12u8 {
            let holder = Account {
                nonce: i as u64,
                balance: U256::from(i as u64) * U256::exp10(18),
                storage_root: EMPTY_TRIE_ROOT,
                code_hash: EMPTY_CODE_HASH,
            };
            state.insert(&account_trie_key(&[i; 20]), &encode_account(&holder));
        }

        let header = sample_header(number, state.root_hash());
        let hash = header.hash();
        Self {
            header,
            hash,
            contract,
            account,
            state,
            storage,
            values,
        }
    }

    pub fn state_root(&self) -> H256 {
        self.header.state_root
    }

    pub fn account_proof(&self, address: &Address) -> Vec<Vec<u8>> {
        self.state.proof(&account_trie_key(address))
    }

    pub fn storage_proof(&self, slot: &H256) -> Vec<Vec<u8>> {
        self.storage.proof(&storage_trie_key(slot))
    }

    pub fn block_response(&self) -> BlockResponse {
        BlockResponse {
            hash: self.hash,
            header: self.header.clone(),
        }
    }

    /// What an honest node would answer to `eth_getProof` for the contract or
    /// for an address that is not in the state
    pub fn proof_response(&self, address: &Address, slots: &[H256]) -> AccountProofResponse {
        let is_contract = *address == self.contract;
        let account = if is_contract {
            self.account.clone()
        } else {
            Account::empty()
        };
        let storage_proof = slots
            .iter()
            .map(|slot| match is_contract {
                true => StorageProofResponse {
                    key: *slot,
                    value: self.values.get(slot).copied().unwrap_or_default(),
                    proof: self.storage_proof(slot),
                },
                false => StorageProofResponse {
                    key: *slot,
                    value: U256::zero(),
                    proof: Vec::new(),
                },
            })
            .collect();

        AccountProofResponse {
            account_proof: self.account_proof(address),
            balance: account.balance,
            code_hash: account.code_hash,
            nonce: account.nonce,
            storage_hash: account.storage_root,
            storage_proof,
        }
    }
}

fn sample_header(number: u64, state_root: H256) -> BlockHeader {
    BlockHeader {
        parent_hash: keccak256(&number.to_be_bytes()),
        uncles_hash: keccak256(&[0xc0]),
        coinbase: [0xcb; 20],
        state_root,
        transactions_root: EMPTY_TRIE_ROOT,
        receipts_root: EMPTY_TRIE_ROOT,
        logs_bloom: [0u8; 256],
        difficulty: U256::zero(),
        number,
        gas_limit: 30_000_000,
        gas_used: 0,
        timestamp: 1_700_000_000 + number * 12,
        extra_data: b"storage proofs".to_vec(),
        mix_hash: [0x5a; 32],
        nonce: [0u8; 8],
        base_fee: Some(U256::from(7u64)),
        withdrawals_root: Some(EMPTY_TRIE_ROOT),
        blob_gas_used: None,
        excess_blob_gas: None,
        parent_beacon_block_root: None,
        requests_hash: None,
    }
}

mod tests {
    use super::*;
    use crate::rlp_encoding::EMPTY_TRIE_ROOT;

    #[test]
    fn test_empty_root() {
        assert_eq!(TestTrie::new().root_hash(), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_overwrite_keeps_single_leaf() {
        let mut trie = TestTrie::new();
        trie.insert(b"key", b"value1");
        let first = trie.root_hash();
        trie.insert(b"key", b"value2");
        assert_ne!(first, trie.root_hash());
        assert_eq!(trie.proof(b"key").len(), 1);
    }

    #[test]
    fn test_insertion_order_does_not_change_root() {
        let pairs: [(&[u8], &[u8]); 4] =
            [(b"do", b"verb"), (b"dog", b"puppy"), (b"doge", b"coin"), (b"horse", b"stallion")];

        let mut forward = TestTrie::new();
        for (k, v) in pairs {
            forward.insert(k, v);
        }
        let mut backward = TestTrie::new();
        for (k, v) in pairs.iter().rev() {
            backward.insert(k, v);
        }
        assert_eq!(forward.root_hash(), backward.root_hash());
    }
}

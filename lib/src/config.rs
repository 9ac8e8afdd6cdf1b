use serde::{Deserialize, Serialize};

/// Longest proof accepted for a 32-byte key: one node per nibble.
pub const MAX_PROOF_NODES: usize = 64;

/// Limits applied by [`crate::ProofVerifier`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub max_proof_nodes: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_proof_nodes: MAX_PROOF_NODES,
        }
    }
}

/// Settings for [`crate::StorageProver`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Verify fetched proofs locally before packaging them
    pub verify: bool,
    pub verifier: VerifierConfig,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            verify: true,
            verifier: VerifierConfig::default(),
        }
    }
}

// Grounded on crates/networking/src/traits.rs's async validation hook and
// crates/crypto's verify_* free functions; spec.md §6 specifies the
// contract as callback-based ("validate(data, onSuccess, onFailure)"),
// which async/await collapses into a single awaited Result without change
// of observable behavior under the single-reactor-thread model of §5.
//! Per-segment signature validation, run before hash-chain verification.

use async_trait::async_trait;
use difs_crypto::signer::{verify_ecdsa, verify_hash_chain};
use difs_types::{Data, SignatureType};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("signature check failed: {0}")]
    Failed(String),
    #[error("no verifying key available for signer identity")]
    NoKey,
}

/// Validates one segment's `signature_value` against its `signed_portion`
/// (§4.2 step 4, "Submit the Data to the validator").
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, data: &Data) -> Result<(), ValidationError>;
}

/// Reference validator: checks the chain-head segment's asymmetric ECDSA
/// signature against a known public key, and every other hash-chain
/// segment's keyless SHA-256 "signature" by recomputation. Segments whose
/// signature type isn't one of the two hash-chain types are accepted
/// as-is, matching §4.3's "accept as-is" rule for out-of-contract types
/// (signature presence alone is still checked by the underlying producer
/// invariants, not re-derived here).
pub struct ChainAwareValidator {
    chain_head_public_key: Vec<u8>,
}

impl ChainAwareValidator {
    pub fn new(chain_head_public_key: Vec<u8>) -> Self {
        Self {
            chain_head_public_key,
        }
    }
}

#[async_trait]
impl Validator for ChainAwareValidator {
    async fn validate(&self, data: &Data) -> Result<(), ValidationError> {
        let signed_portion = data.signed_portion();
        match data.signature_info.signature_type {
            SignatureType::HashChainEcdsa => {
                verify_ecdsa(&self.chain_head_public_key, &signed_portion, &data.signature_value)
                    .map_err(|e| ValidationError::Failed(e.to_string()))
            }
            SignatureType::HashChainSha256 => {
                verify_hash_chain(&signed_portion, &data.signature_value)
                    .map_err(|e| ValidationError::Failed(e.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Accepts every segment without inspection. Useful for substrate-only
/// tests of the fetcher's congestion control and ordering logic, where
/// producer-side signing correctness is not under test.
#[derive(Default, Clone, Copy)]
pub struct AcceptAllValidator;

#[async_trait]
impl Validator for AcceptAllValidator {
    async fn validate(&self, _data: &Data) -> Result<(), ValidationError> {
        Ok(())
    }
}

// Grounded on crates/crypto/src/sign/eddsa/mod.rs's signer shape
// (keypair -> sign/verify), adapted to the chain-head/hash-chain split of
// spec.md §4.1.
//! Signers used by the hash-chain producer and the consumer-side
//! validator's chain-head check.

use crate::error::CryptoError;
use crate::hash::sha256;
use ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};

/// Something that can produce a signature over a segment's signed portion.
/// Both the asymmetric chain-head signer and the keyless hash-chain
/// "signer" implement this so `difs-producer` can treat them uniformly.
pub trait Signer {
    fn sign(&self, message: &[u8]) -> Vec<u8>;
    fn signature_type(&self) -> difs_types::SignatureType;
}

/// The chain head (segment N-1) is the only segment protected by a real
/// asymmetric signature (§3 glossary: "Chain head").
pub struct EcdsaChainHeadSigner {
    signing_key: SigningKey,
}

impl EcdsaChainHeadSigner {
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    pub fn verifying_key_bytes(&self) -> Vec<u8> {
        self.verifying_key().to_sec1_bytes().to_vec()
    }
}

impl Signer for EcdsaChainHeadSigner {
    fn sign(&self, message: &[u8]) -> Vec<u8> {
        let digest = sha256(message);
        let signature: Signature = self.signing_key.sign(&digest);
        signature.to_bytes().to_vec()
    }

    fn signature_type(&self) -> difs_types::SignatureType {
        difs_types::SignatureType::HashChainEcdsa
    }
}

/// Every segment but the chain head is "signed" with a keyless hash over
/// its signed portion (§4.1 rationale: "Exactly one asymmetric signature
/// is therefore amortized over the whole object").
#[derive(Default, Clone, Copy)]
pub struct HashChainSha256Signer;

impl Signer for HashChainSha256Signer {
    fn sign(&self, message: &[u8]) -> Vec<u8> {
        sha256(message).to_vec()
    }

    fn signature_type(&self) -> difs_types::SignatureType {
        difs_types::SignatureType::HashChainSha256
    }
}

/// Verifies the chain head's asymmetric ECDSA signature against a known
/// public key. This is the one per-object call into a public-key
/// validator (§1: "validate each received segment first with a supplied
/// public-key validator").
pub fn verify_ecdsa(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), CryptoError> {
    let verifying_key = VerifyingKey::from_sec1_bytes(public_key_bytes)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let signature = Signature::try_from(signature_bytes)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let digest = sha256(message);
    verifying_key
        .verify(&digest, &signature)
        .map_err(|_| CryptoError::VerificationFailed)
}

/// Recomputes the keyless hash-chain "signature" over `message` and checks
/// it matches `signature_bytes`.
pub fn verify_hash_chain(message: &[u8], signature_bytes: &[u8]) -> Result<(), CryptoError> {
    if sha256(message).as_slice() == signature_bytes {
        Ok(())
    } else {
        Err(CryptoError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn ecdsa_chain_head_signature_roundtrips() {
        let signing_key = SigningKey::random(&mut OsRng);
        let signer = EcdsaChainHeadSigner::new(signing_key);
        let msg = b"segment signed portion";
        let sig = signer.sign(msg);
        verify_ecdsa(&signer.verifying_key_bytes(), msg, &sig).unwrap();
    }

    #[test]
    fn ecdsa_signature_rejects_tampered_message() {
        let signing_key = SigningKey::random(&mut OsRng);
        let signer = EcdsaChainHeadSigner::new(signing_key);
        let sig = signer.sign(b"original");
        assert!(verify_ecdsa(&signer.verifying_key_bytes(), b"tampered", &sig).is_err());
    }

    #[test]
    fn hash_chain_signature_roundtrips() {
        let signer = HashChainSha256Signer;
        let msg = b"segment signed portion";
        let sig = signer.sign(msg);
        assert_eq!(sig.len(), 32);
        verify_hash_chain(msg, &sig).unwrap();
    }

    #[test]
    fn hash_chain_signature_rejects_tampered_message() {
        let signer = HashChainSha256Signer;
        let sig = signer.sign(b"original");
        assert!(verify_hash_chain(b"tampered", &sig).is_err());
    }
}

// Grounded on crates/crypto/src/key_store.rs: same V1 on-disk envelope
// (magic/version/KDF params/salt/nonce/ciphertext) and zeroize-on-drop
// discipline, reimplemented against the `chacha20poly1305`/`argon2` crates
// (the teacher's `dcrypt` dependency is a narrow, unverifiable-on-the-open
// registry crate for this workspace; see DESIGN.md).
//!
//! Format V1:
//! [ Magic: "DIFSKEY1" (8) ]
//! [ Version: u16 (2) ]
//! [ Salt: 16B ]
//! [ Nonce: 12B ]
//! [ Ciphertext + Tag: N + 16 ]

use crate::error::CryptoError;
use argon2::Argon2;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use p256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::RwLock;
use zeroize::{Zeroize, ZeroizeOnDrop};

const HEADER_MAGIC: &[u8; 8] = b"DIFSKEY1";
const HEADER_VERSION: u16 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEK_LEN: usize = 32;
const HEADER_LEN: usize = 8 + 2 + SALT_LEN + NONCE_LEN;

/// A container for sensitive key bytes that zeroizes on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SensitiveBytes(pub Vec<u8>);

/// Encrypts raw key bytes under a passphrase, in the V1 envelope.
pub fn encrypt_key(secret: &[u8], passphrase: &str) -> Result<Vec<u8>, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce_bytes);

    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(HEADER_MAGIC);
    header.extend_from_slice(&HEADER_VERSION.to_be_bytes());
    header.extend_from_slice(&salt);
    header.extend_from_slice(&nonce_bytes);

    let mut kek = [0u8; KEK_LEN];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), &salt, &mut kek)
        .map_err(|e| CryptoError::OperationFailed(format!("argon2 derivation failed: {e}")))?;

    let cipher = ChaCha20Poly1305::new((&kek).into());
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, secret)
        .map_err(|_| CryptoError::OperationFailed("encryption failed".to_string()))?;

    let mut output = header;
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypts a key file blob produced by [`encrypt_key`].
pub fn decrypt_key(data: &[u8], passphrase: &str) -> Result<SensitiveBytes, CryptoError> {
    if data.len() < HEADER_LEN {
        return Err(CryptoError::InvalidInput("file too short".to_string()));
    }
    if &data[0..8] != HEADER_MAGIC {
        return Err(CryptoError::InvalidInput(
            "invalid file signature".to_string(),
        ));
    }
    let version = u16::from_be_bytes([data[8], data[9]]);
    if version != HEADER_VERSION {
        return Err(CryptoError::InvalidInput(format!(
            "unsupported key format version: {version}"
        )));
    }
    let salt = &data[10..10 + SALT_LEN];
    let nonce_bytes = &data[10 + SALT_LEN..HEADER_LEN];
    let ciphertext = &data[HEADER_LEN..];

    let mut kek = [0u8; KEK_LEN];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut kek)
        .map_err(|e| CryptoError::OperationFailed(format!("argon2 derivation failed: {e}")))?;

    let cipher = ChaCha20Poly1305::new((&kek).into());
    let nonce = Nonce::from_slice(nonce_bytes);
    let plaintext = cipher.decrypt(nonce, ciphertext).map_err(|_| {
        CryptoError::OperationFailed(
            "decryption failed (wrong passphrase or corrupted file)".to_string(),
        )
    })?;

    Ok(SensitiveBytes(plaintext))
}

/// A handle to a named signing identity's private key material. The core
/// never mints or stores private keys itself (spec.md §1 Non-goals); it
/// only asks a [`KeyStore`] to resolve one by name.
pub struct SigningKeyHandle {
    pub identity: String,
    pub signing_key: SigningKey,
}

impl SigningKeyHandle {
    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }
}

/// External collaborator that resolves named signing identities to key
/// material (§9 design note: "model this as an injected `KeyStore`
/// trait/interface, not a process singleton").
pub trait KeyStore: Send + Sync {
    fn identity_key(&self, identity: &str) -> Result<SigningKeyHandle, CryptoError>;
}

/// A process-local, in-memory key store. Suitable for the reference CLIs
/// and tests; production deployments inject their own `KeyStore` backed by
/// an HSM, encrypted file (via [`encrypt_key`]/[`decrypt_key`]), or remote
/// signer.
#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<String, SigningKey>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self, identity: &str) -> VerifyingKey {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = *signing_key.verifying_key();
        if let Ok(mut keys) = self.keys.write() {
            keys.insert(identity.to_string(), signing_key);
        }
        verifying_key
    }

    pub fn insert(&self, identity: &str, signing_key: SigningKey) {
        if let Ok(mut keys) = self.keys.write() {
            keys.insert(identity.to_string(), signing_key);
        }
    }
}

impl KeyStore for InMemoryKeyStore {
    fn identity_key(&self, identity: &str) -> Result<SigningKeyHandle, CryptoError> {
        let keys = self
            .keys
            .read()
            .map_err(|_| CryptoError::OperationFailed("key store lock poisoned".to_string()))?;
        let signing_key = keys
            .get(identity)
            .cloned()
            .ok_or_else(|| CryptoError::UnknownIdentity(identity.to_string()))?;
        Ok(SigningKeyHandle {
            identity: identity.to_string(),
            signing_key,
        })
    }
}

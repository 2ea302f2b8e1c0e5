#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # difs-crypto
//!
//! Cryptographic primitives for the hash-chain segmented transfer core:
//! the [`key_store::KeyStore`] trait and an in-memory implementation, the
//! chain-head ECDSA signer and keyless hash-chain signer, hash functions
//! (SHA-256, BLAKE2s, BLAKE3), and an encrypted on-disk key envelope.

pub mod error;
pub mod hash;
pub mod key_store;
pub mod signer;

pub use error::CryptoError;
pub use hash::{link_anchor, sha256, HashFunction};
pub use key_store::{InMemoryKeyStore, KeyStore, SigningKeyHandle};
pub use signer::{EcdsaChainHeadSigner, HashChainSha256Signer, Signer};

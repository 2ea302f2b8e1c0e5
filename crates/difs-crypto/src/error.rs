// Grounded on crates/crypto/src/error.rs and ioi_types::error::CryptoError's
// ErrorCode pattern.
//! Error type for cryptographic operations.

use difs_types::error::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("invalid cryptographic key: {0}")]
    InvalidKey(String),
    #[error("invalid signature format: {0}")]
    InvalidSignature(String),
    #[error("unknown signing identity: {0}")]
    UnknownIdentity(String),
    #[error("cryptographic operation failed: {0}")]
    OperationFailed(String),
    #[error("invalid input for operation: {0}")]
    InvalidInput(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            Self::VerificationFailed => "CRYPTO_VERIFICATION_FAILED",
            Self::InvalidKey(_) => "CRYPTO_INVALID_KEY",
            Self::InvalidSignature(_) => "CRYPTO_INVALID_SIGNATURE",
            Self::UnknownIdentity(_) => "CRYPTO_UNKNOWN_IDENTITY",
            Self::OperationFailed(_) => "CRYPTO_OPERATION_FAILED",
            Self::InvalidInput(_) => "CRYPTO_INVALID_INPUT",
        }
    }
}

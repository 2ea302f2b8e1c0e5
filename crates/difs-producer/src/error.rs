// Grounded on the ErrorCode pattern used throughout crates/types/src/error.
use difs_crypto::CryptoError;
use difs_types::error::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("failed to read input stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("signer identity error: {0}")]
    Signing(#[from] CryptoError),
}

impl ErrorCode for ProducerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "PRODUCER_IO_ERROR",
            Self::Signing(_) => "PRODUCER_SIGNING_ERROR",
        }
    }
}

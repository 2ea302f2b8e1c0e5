// Grounded on crates/types/src/error/mod.rs's ErrorCode trait, specialized to
// the six fatal fetch errors named in spec.md §6/§7.
//! Fatal fetch errors, each carrying both a stable string code (the
//! workspace convention) and the numeric code named in §6.

use difs_types::ErrorCode;
use thiserror::Error;

/// One of the six fatal transfer errors from §6. Each variant is terminal:
/// firing any of them ends the transfer (§7, "fire onError once, cancel
/// everything, transition to terminal").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("interest timed out: no segment received within maxTimeout")]
    InterestTimeout,
    #[error("response name's last component is not a segment number")]
    DataHasNoSegment,
    #[error("segment failed validator check: {0}")]
    SegmentValidationFail(String),
    #[error("non-recoverable nack: {0}")]
    NackError(String),
    #[error("final-block-id component is not a segment number")]
    FinalBlockIdNotSegment,
    #[error("hash-chain verification failed: {0}")]
    HashChainError(String),
}

impl FetchError {
    /// The numeric code named in spec.md §6.
    pub fn numeric_code(&self) -> u8 {
        match self {
            FetchError::InterestTimeout => 1,
            FetchError::DataHasNoSegment => 2,
            FetchError::SegmentValidationFail(_) => 3,
            FetchError::NackError(_) => 4,
            FetchError::FinalBlockIdNotSegment => 5,
            FetchError::HashChainError(_) => 6,
        }
    }
}

impl ErrorCode for FetchError {
    fn code(&self) -> &'static str {
        match self {
            FetchError::InterestTimeout => "FETCH_INTEREST_TIMEOUT",
            FetchError::DataHasNoSegment => "FETCH_DATA_HAS_NO_SEGMENT",
            FetchError::SegmentValidationFail(_) => "FETCH_SEGMENT_VALIDATION_FAIL",
            FetchError::NackError(_) => "FETCH_NACK_ERROR",
            FetchError::FinalBlockIdNotSegment => "FETCH_FINALBLOCKID_NOT_SEGMENT",
            FetchError::HashChainError(_) => "FETCH_HASHCHAIN_ERROR",
        }
    }
}

// Grounded on crates/types/src/error/mod.rs (ErrorCode trait + thiserror enums).
//! Shared error types for the `difs` workspace.

use thiserror::Error;

/// Assigns a stable, machine-readable string code to an error variant, the
/// way every error enum in the teacher kernel does.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors from decoding/encoding the wire model (names, TLVs, segments).
#[derive(Error, Debug)]
pub enum CoreError {
    /// A TLV's declared length did not match the remaining buffer.
    #[error("truncated TLV: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    /// A varint exceeded the maximum representable width.
    #[error("varint too long")]
    VarintTooLong,
    /// A name component was not a valid segment marker.
    #[error("name component is not a segment number")]
    NotASegmentComponent,
    /// A `NextHash` field did not carry exactly 32 bytes.
    #[error("invalid NextHash length: expected 32, got {0}")]
    InvalidNextHashLength(usize),
    /// Generic decode failure with context.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ErrorCode for CoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "CORE_TRUNCATED",
            Self::VarintTooLong => "CORE_VARINT_TOO_LONG",
            Self::NotASegmentComponent => "CORE_NOT_A_SEGMENT",
            Self::InvalidNextHashLength(_) => "CORE_INVALID_NEXTHASH_LEN",
            Self::Decode(_) => "CORE_DECODE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

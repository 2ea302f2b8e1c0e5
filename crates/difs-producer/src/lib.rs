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

//! # difs-producer
//!
//! The hash-chain signer of spec.md §4.1: takes a byte stream and a
//! versioned name prefix and produces an ordered array of signed segments
//! whose signatures form a reverse hash chain, so that only the
//! highest-numbered ("chain head") segment carries a full asymmetric
//! signature.

pub mod error;
pub mod signer;

pub use error::ProducerError;
pub use signer::{sign_object, SignerOptions};

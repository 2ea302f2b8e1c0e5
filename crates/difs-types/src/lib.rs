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

//! # difs-types
//!
//! Wire model for the hash-chain segmented transfer core: hierarchical
//! names, segment (`Data`) carriers, the `SignatureInfo`/`NextHash`
//! extension, and the shared error/result types used across the `difs`
//! workspace.

pub mod data;
pub mod error;
pub mod name;
pub mod signature;
pub mod tlv;

pub use data::Data;
pub use error::{CoreError, ErrorCode, Result};
pub use name::{Name, NameComponent};
pub use signature::{SignatureInfo, SignatureType, NEXT_HASH_LEN};

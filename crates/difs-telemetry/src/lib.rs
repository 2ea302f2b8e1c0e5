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

//! # difs-telemetry
//!
//! Structured logging init, grounded on `crates/telemetry/src/init.rs`.

pub mod init;

pub use init::init_tracing;

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

//! # difs-cli
//!
//! Reference producer/consumer binaries for the hash-chain segmented
//! transfer core (spec.md §6, "reference tooling only, not part of the
//! library core"). The two binaries cooperate through a local segment
//! store (see [`store`]), the filesystem stand-in for a reachable NDN
//! network used by `difs-producer` and `difs-consumer` alike.

pub mod directory_face;
pub mod store;

pub use directory_face::DirectoryFace;

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

//! # difs-fetcher
//!
//! The congestion-controlled, hash-chain-verifying segment fetcher: the
//! consumer-side engine of the hash-chain segmented transfer core.

pub mod callbacks;
pub mod congestion;
pub mod error;
pub mod face;
pub mod fetcher;
pub mod metrics;
pub mod options;
pub mod pending;
pub mod rtt;
pub mod testing;
pub mod validator;
pub mod verifier;

pub use callbacks::FetcherCallbacks;
pub use error::FetchError;
pub use face::{Face, FaceEvent, Interest, NackReason};
pub use fetcher::{start, FetcherHandle};
pub use metrics::{install_metrics_sink, FetcherMetricsSink};
pub use options::FetchParameters;
pub use rtt::{JacobsonRttEstimator, RttEstimator, RttOptions};
pub use validator::{AcceptAllValidator, ChainAwareValidator, Validator};
pub use verifier::HashChainVerifyMode;

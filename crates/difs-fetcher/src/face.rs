// Transport contract grounded on crates/networking/src/traits.rs's
// #[async_trait] Face-equivalent shape, specialized to spec.md §6's
// "express(interest, onData, onNack, onTimeout) -> PendingInterestHandle"
// contract. Rust's async/await collapses the three callbacks into a single
// awaited outcome; the face itself is responsible for enforcing
// `interest.lifetime` and resolving to `FaceEvent::Timeout` when it elapses,
// since dropping the returned future is how a caller cancels a request (the
// idiomatic replacement for dropping a `PendingInterestHandle`).
//! The request/response transport face consumed by the fetcher.

use async_trait::async_trait;
use difs_types::Name;
use std::time::Duration;

/// A request for one segment (or, during discovery, for the lowest segment
/// under a prefix with `can_be_prefix = true`).
#[derive(Debug, Clone)]
pub struct Interest {
    pub name: Name,
    pub can_be_prefix: bool,
    pub must_be_fresh: bool,
    pub lifetime: Duration,
    /// Distinguishes retransmissions of the same name at the substrate
    /// level (refreshed on every re-issue of the discovery interest, per
    /// §4.2's "re-issue the discovery request (with refreshed nonce)").
    pub nonce: u64,
}

/// Reasons a substrate can nack a request (§4.2, "Nack/timeout handling").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NackReason {
    /// A loss-equivalent nack: treated exactly like a timeout.
    Duplicate,
    Congestion,
    /// Any other reason is fatal (`NACK_ERROR`).
    Other(String),
}

/// The outcome of expressing one [`Interest`].
#[derive(Debug, Clone)]
pub enum FaceEvent {
    Data(difs_types::Data),
    Nack(NackReason),
    Timeout,
}

/// The request/response substrate (§6, "Transport face (consumed)").
#[async_trait]
pub trait Face: Send + Sync {
    /// Sends `interest` and resolves to its eventual outcome. Dropping the
    /// returned future cancels the request, the idiomatic equivalent of
    /// dropping a `PendingInterestHandle`.
    async fn express(&self, interest: Interest) -> FaceEvent;
}

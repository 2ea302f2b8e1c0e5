// Field list and defaults transcribed from spec.md §4.2 ("Options
// (enumerated)"); constructed the way the teacher builds its *Args/*Config
// structs in cli/src/commands — plain struct-update over Default, no
// external config file format.
//! Tunable parameters for a single fetch, mirroring §4.2's options list.

use crate::rtt::RttOptions;
use crate::verifier::HashChainVerifyMode;
use std::time::Duration;

/// The minimum slow-start threshold the congestion controller will ever
/// fall back to (named `MIN_SSTHRESH` in §4.2's `windowDecrease` rule).
pub const MIN_SSTHRESH: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct FetchParameters {
    pub init_cwnd: f64,
    pub init_ssthresh: f64,
    pub ai_step: f64,
    pub md_coef: f64,
    pub use_constant_cwnd: bool,
    pub disable_cwa: bool,
    pub reset_cwnd_to_init: bool,

    pub interest_lifetime: Duration,
    pub max_timeout: Duration,
    pub use_constant_interest_timeout: bool,

    pub in_order: bool,
    pub flow_control_window: usize,

    pub ignore_cong_marks: bool,

    pub rtt_options: RttOptions,

    /// §9 Open Question: anchored-count heuristic (default) vs. strict
    /// per-segment hash-chain check.
    pub hash_chain_mode: HashChainVerifyMode,
}

impl Default for FetchParameters {
    fn default() -> Self {
        Self {
            init_cwnd: 1.0,
            init_ssthresh: f64::INFINITY,
            ai_step: 1.0,
            md_coef: 0.5,
            use_constant_cwnd: false,
            disable_cwa: false,
            reset_cwnd_to_init: false,
            interest_lifetime: Duration::from_secs(2),
            max_timeout: Duration::from_secs(60),
            use_constant_interest_timeout: false,
            in_order: false,
            flow_control_window: 256,
            ignore_cong_marks: false,
            rtt_options: RttOptions::default(),
            hash_chain_mode: HashChainVerifyMode::Anchored,
        }
    }
}

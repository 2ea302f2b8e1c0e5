// Grounded on crates/networking/src/libp2p/sync.rs's round-trip timing
// helpers, generalized to the full Karn/Jacobson estimator spec.md §6
// names as an external contract ("RTT estimator (consumed)").
//! Smoothed RTT / RTO estimation, Jacobson's algorithm with Karn's rule
//! applied by the caller (retransmitted segments are never fed in, per
//! §4.2 post-validation step 2).

use std::time::Duration;

/// `addMeasurement(rtt, nOutstanding)`; `backoffRto()`; `estimatedRto()`
/// (§6, "RTT estimator (consumed)").
pub trait RttEstimator: Send + Sync {
    /// Feeds one non-retransmitted round-trip sample.
    fn add_measurement(&mut self, rtt: Duration, n_outstanding: u32);
    /// Doubles (or otherwise backs off) the current RTO after a timeout.
    fn backoff_rto(&mut self);
    /// The current retransmission timeout estimate.
    fn estimated_rto(&self) -> Duration;
}

/// Tuning knobs passed through from `FetchParameters::rtt_options`
/// (§4.2's `rttOptions`).
#[derive(Debug, Clone, Copy)]
pub struct RttOptions {
    pub alpha: f64,
    pub beta: f64,
    pub k: f64,
    pub initial_rto: Duration,
    pub min_rto: Duration,
    pub max_rto: Duration,
}

impl Default for RttOptions {
    fn default() -> Self {
        Self {
            alpha: 0.125,
            beta: 0.25,
            k: 4.0,
            initial_rto: Duration::from_secs(1),
            min_rto: Duration::from_millis(200),
            max_rto: Duration::from_secs(60),
        }
    }
}

/// Jacobson/Karn smoothed-RTT estimator: `srtt`/`rttvar` exponentially
/// weighted moving averages, `rto = srtt + k * rttvar`, doubled on each
/// consecutive backoff and reset to the fresh estimate on the next clean
/// sample.
pub struct JacobsonRttEstimator {
    options: RttOptions,
    srtt: Option<Duration>,
    rttvar: Duration,
    rto: Duration,
}

impl JacobsonRttEstimator {
    pub fn new(options: RttOptions) -> Self {
        Self {
            rto: options.initial_rto,
            options,
            srtt: None,
            rttvar: Duration::from_secs(0),
        }
    }

    fn clamp(&self, rto: Duration) -> Duration {
        rto.clamp(self.options.min_rto, self.options.max_rto)
    }
}

impl Default for JacobsonRttEstimator {
    fn default() -> Self {
        Self::new(RttOptions::default())
    }
}

impl RttEstimator for JacobsonRttEstimator {
    fn add_measurement(&mut self, rtt: Duration, _n_outstanding: u32) {
        let rtt_secs = rtt.as_secs_f64();
        let (srtt_secs, rttvar_secs) = match self.srtt {
            None => (rtt_secs, rtt_secs / 2.0),
            Some(prev) => {
                let prev_secs = prev.as_secs_f64();
                let rttvar_secs = (1.0 - self.options.beta) * self.rttvar.as_secs_f64()
                    + self.options.beta * (prev_secs - rtt_secs).abs();
                let srtt_secs =
                    (1.0 - self.options.alpha) * prev_secs + self.options.alpha * rtt_secs;
                (srtt_secs, rttvar_secs)
            }
        };
        self.srtt = Some(Duration::from_secs_f64(srtt_secs.max(0.0)));
        self.rttvar = Duration::from_secs_f64(rttvar_secs.max(0.0));
        let rto = Duration::from_secs_f64(srtt_secs + self.options.k * rttvar_secs);
        self.rto = self.clamp(rto);
    }

    fn backoff_rto(&mut self) {
        self.rto = self.clamp(self.rto.saturating_mul(2));
    }

    fn estimated_rto(&self) -> Duration {
        self.rto
    }
}

// AIMD controller transcribed from spec.md §4.2 ("Congestion control"),
// grounded in the window/backoff bookkeeping style of
// crates/networking/src/libp2p/sync.rs's retry accounting.
//! Slow-start / congestion-avoidance window controller.

use crate::options::{FetchParameters, MIN_SSTHRESH};

pub struct CongestionController {
    cwnd: f64,
    ssthresh: f64,
    rec_point: u64,
    ai_step: f64,
    md_coef: f64,
    init_cwnd: f64,
    use_constant_cwnd: bool,
    disable_cwa: bool,
    reset_cwnd_to_init: bool,
}

impl CongestionController {
    pub fn new(options: &FetchParameters) -> Self {
        Self {
            cwnd: options.init_cwnd,
            ssthresh: options.init_ssthresh,
            rec_point: 0,
            ai_step: options.ai_step,
            md_coef: options.md_coef,
            init_cwnd: options.init_cwnd,
            use_constant_cwnd: options.use_constant_cwnd,
            disable_cwa: options.disable_cwa,
            reset_cwnd_to_init: options.reset_cwnd_to_init,
        }
    }

    pub fn cwnd(&self) -> f64 {
        self.cwnd
    }

    pub fn ssthresh(&self) -> f64 {
        self.ssthresh
    }

    /// §4.2: "slow start `cwnd += aiStep` while `cwnd < ssthresh`;
    /// otherwise congestion avoidance `cwnd += aiStep / floor(cwnd)`."
    pub fn window_increase(&mut self) {
        if self.use_constant_cwnd {
            return;
        }
        if self.cwnd < self.ssthresh {
            self.cwnd += self.ai_step;
        } else {
            let floor = self.cwnd.floor().max(1.0);
            self.cwnd += self.ai_step / floor;
        }
    }

    /// §4.2: "guarded by `disableCwa` OR `highData > recPoint`; on fire,
    /// `recPoint := highInterest`, `ssthresh := max(MIN_SSTHRESH, cwnd *
    /// mdCoef)`, and `cwnd := resetCwndToInit ? initCwnd : ssthresh`."
    pub fn window_decrease(&mut self, high_data: u64, high_interest: u64) {
        if self.use_constant_cwnd {
            return;
        }
        if !(self.disable_cwa || high_data > self.rec_point) {
            return;
        }
        self.rec_point = high_interest;
        self.ssthresh = (self.cwnd * self.md_coef).max(MIN_SSTHRESH);
        self.cwnd = if self.reset_cwnd_to_init {
            self.init_cwnd
        } else {
            self.ssthresh
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> FetchParameters {
        FetchParameters {
            init_cwnd: 1.0,
            ai_step: 1.0,
            md_coef: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn slow_start_grows_additively_below_ssthresh() {
        let opts = FetchParameters {
            init_ssthresh: 10.0,
            ..options()
        };
        let mut cc = CongestionController::new(&opts);
        cc.window_increase();
        assert_eq!(cc.cwnd(), 2.0);
    }

    #[test]
    fn congestion_avoidance_grows_sublinearly_above_ssthresh() {
        let opts = FetchParameters {
            init_cwnd: 4.0,
            init_ssthresh: 4.0,
            ..options()
        };
        let mut cc = CongestionController::new(&opts);
        cc.window_increase();
        assert_eq!(cc.cwnd(), 4.0 + 1.0 / 4.0);
    }

    #[test]
    fn window_decrease_respects_recovery_point_guard() {
        let opts = FetchParameters {
            init_cwnd: 8.0,
            ..options()
        };
        let mut cc = CongestionController::new(&opts);
        cc.window_decrease(10, 20);
        let after_first = cc.cwnd();
        assert_eq!(after_first, 4.0);
        // highData (10) <= recPoint (20) now, so a second mark is ignored.
        cc.window_decrease(10, 30);
        assert_eq!(cc.cwnd(), after_first);
    }

    #[test]
    fn ssthresh_never_drops_below_minimum() {
        let opts = FetchParameters {
            init_cwnd: 1.0,
            md_coef: 0.1,
            ..options()
        };
        let mut cc = CongestionController::new(&opts);
        cc.window_decrease(1, 1);
        assert_eq!(cc.ssthresh(), MIN_SSTHRESH);
    }

    #[test]
    fn reset_cwnd_to_init_overrides_ssthresh_on_decrease() {
        let opts = FetchParameters {
            init_cwnd: 1.0,
            reset_cwnd_to_init: true,
            ..options()
        };
        let mut cc = CongestionController::new(&opts);
        cc.window_decrease(1, 1);
        assert_eq!(cc.cwnd(), 1.0);
    }
}

// Grounded on crates/networking/src/metrics/mod.rs's process-global sink
// pattern (OnceCell<&'static dyn Sink> + NopSink default).
//! Fetch-level metrics sink.

use once_cell::sync::OnceCell;

/// Counters a fetch emits over its lifetime.
pub trait FetcherMetricsSink: Send + Sync {
    fn segment_requested(&self, segment_no: u64) {
        let _ = segment_no;
    }
    fn segment_received(&self, segment_no: u64) {
        let _ = segment_no;
    }
    fn segment_retransmitted(&self, segment_no: u64) {
        let _ = segment_no;
    }
    fn window_sample(&self, cwnd: f64) {
        let _ = cwnd;
    }
    fn hash_chain_anchor_verified(&self) {}
}

#[derive(Default)]
pub struct NopSink;

impl FetcherMetricsSink for NopSink {}

static SINK: OnceCell<&'static dyn FetcherMetricsSink> = OnceCell::new();

/// Installs the process-wide metrics sink. Only the first call takes
/// effect, matching the teacher's "first writer wins" `OnceCell` pattern.
pub fn install_metrics_sink(sink: &'static dyn FetcherMetricsSink) {
    let _ = SINK.set(sink);
}

pub fn metrics_sink() -> &'static dyn FetcherMetricsSink {
    *SINK.get_or_init(|| &NopSink)
}

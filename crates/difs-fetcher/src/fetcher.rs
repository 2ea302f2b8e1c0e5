// The segment fetcher state machine, transcribed from spec.md §4.2 in full
// (entry/discovery, steady state, per-response handling, post-validation,
// congestion reaction, nack/timeout recovery, termination) plus §4.3's
// hash-chain verifier and §5's single-threaded cooperative reactor model.
// Grounded on crates/networking/src/libp2p/mod.rs's tokio::select! reactor
// loop over a FuturesUnordered of in-flight requests, and its
// Arc/self-retained-handle-until-stop pattern.
//! The consumer-side fetch engine.

use crate::callbacks::FetcherCallbacks;
use crate::congestion::CongestionController;
use crate::error::FetchError;
use crate::face::{Face, FaceEvent, Interest, NackReason};
use crate::metrics::metrics_sink;
use crate::options::FetchParameters;
use crate::pending::PendingSegmentTable;
use crate::rtt::RttEstimator;
use crate::validator::Validator;
use crate::verifier::HashChainVerifier;
use difs_types::Name;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Pseudo-segment-number the pending-segment table uses to track the
/// discovery interest's state (send time, retransmitted-or-not), per
/// SPEC_FULL §3's note on keeping discovery bookkeeping uniform with the
/// numbered-segment path.
const DISCOVERY_KEY: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKey {
    Discovery,
    Segment(u64),
}

type InFlightFuture = Pin<Box<dyn std::future::Future<Output = (FetchKey, FaceEvent)> + Send>>;

static NONCE_SOURCE: AtomicU64 = AtomicU64::new(1);

fn next_nonce() -> u64 {
    NONCE_SOURCE.fetch_add(1, Ordering::Relaxed)
}

/// A running or completed fetch. Drop (or call [`FetcherHandle::stop`]) to
/// cancel; stopping is idempotent (§8 property 6).
pub struct FetcherHandle {
    stop_tx: watch::Sender<bool>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl FetcherHandle {
    /// Cancels all pending requests and scheduled timeouts and releases
    /// the fetcher's self-retained lifetime (§4.2: "stop() — idempotent").
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(true);
        let handle = self
            .join
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

struct FetcherInner {
    face: Arc<dyn Face>,
    validator: Arc<dyn Validator>,
    rtt: Box<dyn RttEstimator>,
    options: FetchParameters,
    callbacks: FetcherCallbacks,
    congestion: CongestionController,
    verifier: HashChainVerifier,
    table: PendingSegmentTable,
    in_flight: FuturesUnordered<InFlightFuture>,

    base_prefix: Name,
    versioned_prefix: Option<Name>,
    first_response_received: bool,

    received_set: HashSet<u64>,
    received_buffer: BTreeMap<u64, Vec<u8>>,
    next_segment_num: u64,
    n_segments: Option<u64>,

    high_interest: u64,
    high_data: u64,
    last_received_time: Instant,
    next_in_order_cursor: u64,

    terminated: bool,
}

impl FetcherInner {
    fn request_timeout(&self) -> Duration {
        if self.options.use_constant_interest_timeout {
            self.options.max_timeout
        } else {
            self.options.max_timeout.min(self.rtt.estimated_rto())
        }
    }

    fn spawn_interest(&mut self, key: FetchKey, interest: Interest) {
        let face = self.face.clone();
        self.in_flight.push(Box::pin(async move {
            let event = face.express(interest).await;
            (key, event)
        }));
    }

    fn spawn_discovery(&mut self) {
        let now = Instant::now();
        if self.table.contains(DISCOVERY_KEY) {
            self.table.insert_retransmitted(DISCOVERY_KEY, now);
        } else {
            self.table.insert_first_interest(DISCOVERY_KEY, now);
        }
        let interest = Interest {
            name: self.base_prefix.clone(),
            can_be_prefix: true,
            must_be_fresh: true,
            lifetime: self.request_timeout(),
            nonce: next_nonce(),
        };
        self.spawn_interest(FetchKey::Discovery, interest);
    }

    fn pop_next_unrequested(&mut self) -> Option<u64> {
        loop {
            if let Some(n_segments) = self.n_segments {
                if self.next_segment_num >= n_segments {
                    return None;
                }
            }
            let candidate = self.next_segment_num;
            self.next_segment_num += 1;
            if !self.received_set.contains(&candidate) && !self.table.contains(candidate) {
                return Some(candidate);
            }
        }
    }

    /// §4.2: "Each iteration `fetchSegmentsInWindow` computes `available =
    /// min(cwnd, ordered_buffer_slack) − inFlight`, then while `available >
    /// 0` drains the retx FIFO first, otherwise emits the next
    /// un-requested segment number; terminates the loop when nothing is
    /// eligible."
    fn fetch_segments_in_window(&mut self) {
        let Some(versioned_prefix) = self.versioned_prefix.clone() else {
            return;
        };
        loop {
            let in_flight = self.table.in_flight_count() as f64;
            let ordered_slack = if self.options.in_order {
                self.options
                    .flow_control_window
                    .saturating_sub(self.received_buffer.len()) as f64
            } else {
                f64::INFINITY
            };
            let available = self.congestion.cwnd().min(ordered_slack) - in_flight;
            if available <= 0.0 {
                break;
            }
            if let Some(segment_no) = self.table.pop_retransmit(Instant::now()) {
                metrics_sink().segment_retransmitted(segment_no);
                let interest = Interest {
                    name: versioned_prefix.append_segment(segment_no),
                    can_be_prefix: false,
                    must_be_fresh: false,
                    lifetime: self.request_timeout(),
                    nonce: next_nonce(),
                };
                self.spawn_interest(FetchKey::Segment(segment_no), interest);
                continue;
            }
            if let Some(segment_no) = self.pop_next_unrequested() {
                self.table.insert_first_interest(segment_no, Instant::now());
                self.high_interest = self.high_interest.max(segment_no);
                metrics_sink().segment_requested(segment_no);
                let interest = Interest {
                    name: versioned_prefix.append_segment(segment_no),
                    can_be_prefix: false,
                    must_be_fresh: false,
                    lifetime: self.request_timeout(),
                    nonce: next_nonce(),
                };
                self.spawn_interest(FetchKey::Segment(segment_no), interest);
                continue;
            }
            break;
        }
    }

    fn signal_error(&mut self, error: FetchError) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.callbacks.fire_error(error);
    }

    fn maybe_finalize(&mut self) {
        if self.terminated {
            return;
        }
        let Some(n_segments) = self.n_segments else {
            return;
        };
        if (0..n_segments).all(|s| self.received_set.contains(&s)) {
            let final_block_id = n_segments - 1;
            if let Err(e) = self.verifier.check_final_guard(final_block_id) {
                self.signal_error(e);
                return;
            }
            self.terminated = true;
            if self.options.in_order {
                self.callbacks.fire_in_order_complete();
            } else {
                let bytes: Vec<u8> = self
                    .received_buffer
                    .values()
                    .flat_map(|chunk| chunk.clone())
                    .collect();
                self.callbacks.fire_complete(bytes);
            }
        }
    }

    async fn handle_data(&mut self, key: FetchKey, data: difs_types::Data) {
        let segment_no = match data.name.last_segment() {
            Ok(n) => n,
            Err(_) => {
                self.signal_error(FetchError::DataHasNoSegment);
                return;
            }
        };

        let pending_key = match key {
            FetchKey::Discovery => DISCOVERY_KEY,
            FetchKey::Segment(n) => n,
        };
        let Some(pending) = self.table.get(pending_key).cloned() else {
            // Stale or duplicate response: drop silently (§7).
            return;
        };

        self.callbacks.fire_segment_received(&data);

        if let Err(e) = self.validator.validate(&data).await {
            self.signal_error(FetchError::SegmentValidationFail(e.to_string()));
            return;
        }

        let now = Instant::now();
        self.last_received_time = now;
        if pending.state == crate::pending::PendingState::FirstInterest {
            let in_flight = self.table.in_flight_count() as u32;
            self.rtt
                .add_measurement(now.duration_since(pending.send_time), in_flight + 1);
        }
        self.table.remove(pending_key);

        self.received_buffer.insert(segment_no, data.content.clone());
        self.received_set.insert(segment_no);
        self.callbacks.fire_segment_validated(&data);

        if let Some(final_block_id) = data.final_block_id {
            self.n_segments = Some(final_block_id + 1);
            self.table.cancel_above(final_block_id + 1);
        }

        match self.verifier.verify(segment_no, &data) {
            Ok(_) => {}
            Err(e) => {
                self.signal_error(e);
                return;
            }
        }
        if self.options.in_order {
            while let Some(bytes) = self.received_buffer.remove(&self.next_in_order_cursor) {
                self.callbacks.fire_in_order_data(bytes);
                self.next_in_order_cursor += 1;
            }
        }

        if !self.first_response_received {
            self.first_response_received = true;
            self.versioned_prefix = Some(data.name.prefix_dropping_last(1));
            if segment_no == 0 {
                self.next_segment_num = self.next_segment_num.max(1);
            }
        }

        if data.congestion_mark && !self.options.ignore_cong_marks {
            self.congestion.window_decrease(self.high_data, self.high_interest);
        } else {
            self.congestion.window_increase();
        }
        metrics_sink().window_sample(self.congestion.cwnd());
        metrics_sink().hash_chain_anchor_verified();

        self.high_data = self.high_data.max(segment_no);

        self.maybe_finalize();
    }

    fn handle_loss(&mut self, key: FetchKey) {
        self.rtt.backoff_rto();
        if !self.first_response_received {
            self.spawn_discovery();
            return;
        }
        if let FetchKey::Segment(segment_no) = key {
            self.congestion.window_decrease(self.high_data, self.high_interest);
            self.table.enqueue_retransmit(segment_no);
        }
    }

    fn handle_timeout(&mut self, key: FetchKey) {
        self.callbacks.fire_segment_timed_out();
        let now = Instant::now();
        if now.duration_since(self.last_received_time) >= self.options.max_timeout {
            self.signal_error(FetchError::InterestTimeout);
            return;
        }
        self.handle_loss(key);
    }

    fn handle_nack(&mut self, key: FetchKey, reason: NackReason) {
        self.callbacks.fire_segment_nacked();
        match reason {
            NackReason::Duplicate | NackReason::Congestion => self.handle_loss(key),
            NackReason::Other(msg) => self.signal_error(FetchError::NackError(msg)),
        }
    }

    async fn handle_event(&mut self, key: FetchKey, event: FaceEvent) {
        match event {
            FaceEvent::Data(data) => self.handle_data(key, data).await,
            FaceEvent::Timeout => self.handle_timeout(key),
            FaceEvent::Nack(reason) => self.handle_nack(key, reason),
        }
        if !self.terminated {
            self.fetch_segments_in_window();
        }
    }

    async fn run(mut self, mut stop_rx: watch::Receiver<bool>) {
        self.spawn_discovery();
        loop {
            if self.terminated || *stop_rx.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                maybe_event = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    if let Some((key, event)) = maybe_event {
                        self.handle_event(key, event).await;
                    }
                }
            }
        }
    }
}

/// Begins retrieval of the object named by `base_prefix` (§4.2:
/// `start(face, baseInterest, validator, options) -> Fetcher`).
pub fn start(
    base_prefix: Name,
    face: Arc<dyn Face>,
    validator: Arc<dyn Validator>,
    rtt: Box<dyn RttEstimator>,
    options: FetchParameters,
    callbacks: FetcherCallbacks,
) -> FetcherHandle {
    let hash_chain_mode = options.hash_chain_mode;
    let inner = FetcherInner {
        face,
        validator,
        rtt,
        congestion: CongestionController::new(&options),
        verifier: HashChainVerifier::new(hash_chain_mode),
        table: PendingSegmentTable::new(),
        in_flight: FuturesUnordered::new(),
        base_prefix,
        versioned_prefix: None,
        first_response_received: false,
        received_set: HashSet::new(),
        received_buffer: BTreeMap::new(),
        next_segment_num: 0,
        n_segments: None,
        high_interest: 0,
        high_data: 0,
        last_received_time: Instant::now(),
        next_in_order_cursor: 0,
        terminated: false,
        options,
        callbacks,
    };

    let (stop_tx, stop_rx) = watch::channel(false);
    let join = tokio::spawn(inner.run(stop_rx));
    FetcherHandle {
        stop_tx,
        join: Mutex::new(Some(join)),
    }
}

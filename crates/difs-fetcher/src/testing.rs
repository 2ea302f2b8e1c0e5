// An in-memory substrate, standing in for the external transport face
// (§6), grounded in the style of crates/networking's in-process transport
// used by its own test harness. Exposed unconditionally (not behind
// `cfg(test)`) so integration tests under `tests/` — which compile against
// the built library, not its unit-test configuration — can script it.
//! A scriptable in-memory [`Face`] for exercising the fetcher without a
//! real network substrate.

use crate::face::{Face, FaceEvent, Interest, NackReason};
use async_trait::async_trait;
use difs_types::{Data, Name};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::Mutex;

struct ScriptedFaceState {
    segments: HashMap<u64, Data>,
    discovery_segment: u64,
    drop_before_respond: HashMap<u64, u32>,
    congestion_marks: HashSet<u64>,
    nacks: HashMap<u64, NackReason>,
    base_delay: Duration,
    segment_delay: HashMap<u64, Duration>,
}

/// A substrate loaded with a fixed set of segments (typically the output
/// of `difs_producer::sign_object`), with knobs for scripting loss,
/// reordering-by-discovery-target, congestion marks, and nacks.
pub struct ScriptedFace {
    state: Mutex<ScriptedFaceState>,
}

impl ScriptedFace {
    pub fn new(segments: Vec<Data>) -> Self {
        let mut map = HashMap::new();
        for data in segments {
            if let Ok(n) = data.name.last_segment() {
                map.insert(n, data);
            }
        }
        Self {
            state: Mutex::new(ScriptedFaceState {
                segments: map,
                discovery_segment: 0,
                drop_before_respond: HashMap::new(),
                congestion_marks: HashSet::new(),
                nacks: HashMap::new(),
                base_delay: Duration::from_millis(1),
                segment_delay: HashMap::new(),
            }),
        }
    }

    /// Which segment number the discovery (`canBePrefix=true`) interest
    /// resolves to; defaults to 0.
    pub async fn set_discovery_segment(&self, segment_no: u64) {
        self.state.lock().await.discovery_segment = segment_no;
    }

    /// The next `times` requests for `segment_no` resolve to `Timeout`
    /// instead of the real response (§8 scenario S4).
    pub async fn drop_before_respond(&self, segment_no: u64, times: u32) {
        self.state
            .lock()
            .await
            .drop_before_respond
            .insert(segment_no, times);
    }

    /// The response for `segment_no` carries a congestion mark once (§8
    /// scenario S5).
    pub async fn mark_congested(&self, segment_no: u64) {
        self.state.lock().await.congestion_marks.insert(segment_no);
    }

    /// The next request for `segment_no` is nacked with `reason` instead
    /// of answered.
    pub async fn nack_once(&self, segment_no: u64, reason: NackReason) {
        self.state.lock().await.nacks.insert(segment_no, reason);
    }

    pub async fn set_base_delay(&self, delay: Duration) {
        self.state.lock().await.base_delay = delay;
    }

    /// Overrides the response delay for one segment, letting a test race
    /// several in-flight responses into a chosen arrival order (§8 scenario
    /// S2's out-of-order delivery).
    pub async fn set_delay(&self, segment_no: u64, delay: Duration) {
        self.state.lock().await.segment_delay.insert(segment_no, delay);
    }

    /// Corrupts the on-the-wire signature bytes of `segment_no`, for
    /// exercising hash-chain tamper detection (§8 scenario S3).
    pub async fn corrupt_signature(&self, segment_no: u64) {
        let mut state = self.state.lock().await;
        if let Some(data) = state.segments.get_mut(&segment_no) {
            if let Some(byte) = data.signature_value.first_mut() {
                *byte ^= 0xff;
            }
        }
    }

    /// Substitutes a forged-but-self-consistent segment in place of
    /// whatever the face was holding for `data`'s segment number. Since
    /// the keyless hash-chain signature type re-derives from its own
    /// signed portion, a self-signed forgery still passes per-segment
    /// validation — only the previous segment's `NextHash` anchor can
    /// catch it (§8 scenario S3).
    pub async fn replace_segment(&self, data: Data) {
        if let Ok(n) = data.name.last_segment() {
            self.state.lock().await.segments.insert(n, data);
        }
    }
}

#[async_trait]
impl Face for ScriptedFace {
    async fn express(&self, interest: Interest) -> FaceEvent {
        let (target, delay) = {
            let state = self.state.lock().await;
            let target = if interest.can_be_prefix {
                state.discovery_segment
            } else {
                interest.name.last_segment().unwrap_or(state.discovery_segment)
            };
            let delay = state
                .segment_delay
                .get(&target)
                .copied()
                .unwrap_or(state.base_delay);
            (target, delay)
        };
        tokio::time::sleep(delay).await;

        let mut state = self.state.lock().await;
        if let Some(remaining) = state.drop_before_respond.get_mut(&target) {
            if *remaining > 0 {
                *remaining -= 1;
                let lifetime = interest.lifetime;
                drop(state);
                tokio::time::sleep(lifetime).await;
                return FaceEvent::Timeout;
            }
        }
        if let Some(reason) = state.nacks.remove(&target) {
            return FaceEvent::Nack(reason);
        }
        match state.segments.get(&target) {
            Some(data) => {
                let mut data = data.clone();
                data.congestion_mark = state.congestion_marks.remove(&target);
                FaceEvent::Data(data)
            }
            None => FaceEvent::Timeout,
        }
    }
}

/// Convenience: the full versioned name of segment `n`'s data, for tests
/// that need to build expectations without going through the fetcher.
pub fn segment_name(prefix: &Name, n: u64) -> Name {
    prefix.append_segment(n)
}

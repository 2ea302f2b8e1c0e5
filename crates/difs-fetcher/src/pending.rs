// PendingSegment model transcribed from spec.md §3 ("PendingSegment
// (consumer-only)"); retransmit FIFO supplemented from
// examples/original_source's `hc-segment-fetcher.cpp` `m_retxQueue`
// (std::queue<uint64_t>), modeled here as a VecDeque per SPEC_FULL §3.
//! Tracks segments the fetcher has requested but not yet received.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingState {
    FirstInterest,
    InRetxQueue,
    Retransmitted,
}

#[derive(Debug, Clone)]
pub struct PendingSegment {
    pub state: PendingState,
    pub send_time: Instant,
}

/// For each in-flight segment: state, send time, and (implicitly) the
/// cancellation handle — in this reactor model, cancellation is simply
/// removing the segment's in-flight future from the fetcher's
/// `FuturesUnordered` set, so no explicit handle is stored here.
#[derive(Default)]
pub struct PendingSegmentTable {
    entries: HashMap<u64, PendingSegment>,
    retransmit_fifo: VecDeque<u64>,
}

impl PendingSegmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_first_interest(&mut self, segment_no: u64, send_time: Instant) {
        self.entries.insert(
            segment_no,
            PendingSegment {
                state: PendingState::FirstInterest,
                send_time,
            },
        );
    }

    /// Re-marks an existing (or creates a fresh) entry as `Retransmitted`,
    /// used for discovery-interest reissue, which resends immediately
    /// rather than going through the retx FIFO.
    pub fn insert_retransmitted(&mut self, segment_no: u64, send_time: Instant) {
        self.entries.insert(
            segment_no,
            PendingSegment {
                state: PendingState::Retransmitted,
                send_time,
            },
        );
    }

    pub fn get(&self, segment_no: u64) -> Option<&PendingSegment> {
        self.entries.get(&segment_no)
    }

    pub fn remove(&mut self, segment_no: u64) -> Option<PendingSegment> {
        self.entries.remove(&segment_no)
    }

    pub fn contains(&self, segment_no: u64) -> bool {
        self.entries.contains_key(&segment_no)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matches the discovery response to the earliest-created pending
    /// entry (§4.2 step 2: "if first response of the transfer and the
    /// table is non-empty with any key, match the earliest entry").
    pub fn earliest(&self) -> Option<u64> {
        self.entries
            .iter()
            .min_by_key(|(_, p)| p.send_time)
            .map(|(segment_no, _)| *segment_no)
    }

    /// Marks `segment_no` as queued for retransmission and pushes it onto
    /// the retx FIFO (§4.2 "Nack/timeout handling", "push segment onto
    /// retx FIFO").
    pub fn enqueue_retransmit(&mut self, segment_no: u64) {
        if let Some(entry) = self.entries.get_mut(&segment_no) {
            entry.state = PendingState::InRetxQueue;
        }
        self.retransmit_fifo.push_back(segment_no);
    }

    /// Pops the next segment due for retransmission and marks it
    /// `Retransmitted` with a fresh send time.
    pub fn pop_retransmit(&mut self, now: Instant) -> Option<u64> {
        let segment_no = self.retransmit_fifo.pop_front()?;
        if let Some(entry) = self.entries.get_mut(&segment_no) {
            entry.state = PendingState::Retransmitted;
            entry.send_time = now;
        }
        Some(segment_no)
    }

    pub fn has_pending_retransmits(&self) -> bool {
        !self.retransmit_fifo.is_empty()
    }

    /// Count of segments with state in `{FirstInterest, Retransmitted}`,
    /// matching the invariant `segments_in_flight = |{p : p.state in
    /// {FirstInterest, Retransmitted}}|` (§3).
    pub fn in_flight_count(&self) -> usize {
        self.entries
            .values()
            .filter(|p| p.state != PendingState::InRetxQueue)
            .count()
    }

    /// Cancels every pending segment with number `>= n_segments` (§4.2
    /// post-validation step 4, "cancel any pending requests with
    /// segment-number >= nSegments").
    pub fn cancel_above(&mut self, n_segments: u64) {
        self.entries.retain(|segment_no, _| *segment_no < n_segments);
        self.retransmit_fifo.retain(|segment_no| *segment_no < n_segments);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.retransmit_fifo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_matches_first_inserted() {
        let mut table = PendingSegmentTable::new();
        let t0 = Instant::now();
        table.insert_first_interest(5, t0);
        table.insert_first_interest(2, t0 + std::time::Duration::from_millis(1));
        assert_eq!(table.earliest(), Some(5));
    }

    #[test]
    fn retransmit_fifo_is_first_in_first_out() {
        let mut table = PendingSegmentTable::new();
        let now = Instant::now();
        table.insert_first_interest(1, now);
        table.insert_first_interest(2, now);
        table.enqueue_retransmit(1);
        table.enqueue_retransmit(2);
        assert_eq!(table.pop_retransmit(now), Some(1));
        assert_eq!(table.pop_retransmit(now), Some(2));
        assert_eq!(table.pop_retransmit(now), None);
    }

    #[test]
    fn cancel_above_prunes_table_and_fifo() {
        let mut table = PendingSegmentTable::new();
        let now = Instant::now();
        table.insert_first_interest(1, now);
        table.insert_first_interest(5, now);
        table.enqueue_retransmit(5);
        table.cancel_above(3);
        assert!(table.contains(1));
        assert!(!table.contains(5));
        assert!(!table.has_pending_retransmits());
    }
}

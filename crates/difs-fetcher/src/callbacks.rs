// Event fan-out transcribed from spec.md §4.2's "typed observable
// channels" and §9's "callback fan-out (Signal<...>)" note. SPEC_FULL §3
// resolves the original's `ndn::util::signal::Signal` multi-subscriber
// channels as owned `Vec<Box<dyn FnMut(...) + Send>>` subscriber lists,
// since the single-threaded reactor task is the sole owner of fetcher
// state and runs every callback inline — no weak-ref upgrade race exists
// to model.
//! Subscriber registration for fetch lifecycle events.

use crate::error::FetchError;
use difs_types::Data;

/// Builder for a fetch's event subscribers. Register handlers before
/// calling `Fetcher::start`; each registered closure is invoked inline on
/// the fetcher's reactor task as its event occurs.
#[derive(Default)]
pub struct FetcherCallbacks {
    pub(crate) on_complete: Vec<Box<dyn FnMut(Vec<u8>) + Send>>,
    pub(crate) on_in_order_data: Vec<Box<dyn FnMut(Vec<u8>) + Send>>,
    pub(crate) on_in_order_complete: Vec<Box<dyn FnMut() + Send>>,
    pub(crate) after_segment_received: Vec<Box<dyn FnMut(&Data) + Send>>,
    pub(crate) after_segment_validated: Vec<Box<dyn FnMut(&Data) + Send>>,
    pub(crate) after_segment_nacked: Vec<Box<dyn FnMut() + Send>>,
    pub(crate) after_segment_timed_out: Vec<Box<dyn FnMut() + Send>>,
    pub(crate) on_error: Vec<Box<dyn FnMut(FetchError) + Send>>,
}

impl FetcherCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_complete(mut self, f: impl FnMut(Vec<u8>) + Send + 'static) -> Self {
        self.on_complete.push(Box::new(f));
        self
    }

    pub fn on_in_order_data(mut self, f: impl FnMut(Vec<u8>) + Send + 'static) -> Self {
        self.on_in_order_data.push(Box::new(f));
        self
    }

    pub fn on_in_order_complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_in_order_complete.push(Box::new(f));
        self
    }

    pub fn after_segment_received(mut self, f: impl FnMut(&Data) + Send + 'static) -> Self {
        self.after_segment_received.push(Box::new(f));
        self
    }

    pub fn after_segment_validated(mut self, f: impl FnMut(&Data) + Send + 'static) -> Self {
        self.after_segment_validated.push(Box::new(f));
        self
    }

    pub fn after_segment_nacked(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.after_segment_nacked.push(Box::new(f));
        self
    }

    pub fn after_segment_timed_out(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.after_segment_timed_out.push(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(FetchError) + Send + 'static) -> Self {
        self.on_error.push(Box::new(f));
        self
    }

    pub(crate) fn fire_complete(&mut self, bytes: Vec<u8>) {
        for f in &mut self.on_complete {
            f(bytes.clone());
        }
    }

    pub(crate) fn fire_in_order_data(&mut self, bytes: Vec<u8>) {
        for f in &mut self.on_in_order_data {
            f(bytes.clone());
        }
    }

    pub(crate) fn fire_in_order_complete(&mut self) {
        for f in &mut self.on_in_order_complete {
            f();
        }
    }

    pub(crate) fn fire_segment_received(&mut self, data: &Data) {
        for f in &mut self.after_segment_received {
            f(data);
        }
    }

    pub(crate) fn fire_segment_validated(&mut self, data: &Data) {
        for f in &mut self.after_segment_validated {
            f(data);
        }
    }

    pub(crate) fn fire_segment_nacked(&mut self) {
        for f in &mut self.after_segment_nacked {
            f();
        }
    }

    pub(crate) fn fire_segment_timed_out(&mut self) {
        for f in &mut self.after_segment_timed_out {
            f();
        }
    }

    pub(crate) fn fire_error(&mut self, error: FetchError) {
        for f in &mut self.on_error {
            f(error.clone());
        }
    }
}

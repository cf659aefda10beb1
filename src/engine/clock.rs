//! Nanosecond time sources for ack timestamps.
//!
//! The core never reads wall-clock time. Whoever drives the pipeline picks
//! the clock: [`MonotonicClock`] for real runs, [`ManualClock`] when a test
//! or a replay needs exact, reproducible timestamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Successive calls to `now` must be non-decreasing.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Externally advanced clock. With a non-zero `step`, every read also moves
/// time forward by `step` nanoseconds.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
    step: u64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self { now: AtomicU64::new(start), step: 0 }
    }

    pub fn stepping(start: u64, step: u64) -> Self {
        Self { now: AtomicU64::new(start), step }
    }

    pub fn advance(&self, nanos: u64) {
        self.now.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn peek(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

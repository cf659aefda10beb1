//! Observability hook invoked once per acknowledgment.
//!
//! ```text
//!   Executor::process ── Ack ──► Observer::observe(&event, &ack)
//!                                       │
//!                  ┌────────────────────┼────────────────────┐
//!                  ▼                    ▼                    ▼
//!              NoopSink          LatencyMetrics          LogSink
//!             (default)        (control::metrics)     (trace records)
//! ```
//!
//! Empty polls and failed calls are never observed.

use super::executor::Ack;

pub trait Observer<T> {
    fn observe(&mut self, event: &T, ack: &Ack);
}

/// Default sink. Keeps the executor usable with no wiring at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl<T> Observer<T> for NoopSink {
    fn observe(&mut self, _event: &T, _ack: &Ack) {}
}

/// Fan-out: both sinks see every ack, left first.
impl<T, A, B> Observer<T> for (A, B)
where
    A: Observer<T>,
    B: Observer<T>,
{
    fn observe(&mut self, event: &T, ack: &Ack) {
        self.0.observe(event, ack);
        self.1.observe(event, ack);
    }
}

impl<T, O: Observer<T> + ?Sized> Observer<T> for Box<O> {
    fn observe(&mut self, event: &T, ack: &Ack) {
        (**self).observe(event, ack);
    }
}

/// Keeps every observation. Handy for tests and replay diffs.
#[derive(Debug, Clone)]
pub struct RecordingSink<T> {
    pub observations: Vec<(T, Ack)>,
}

impl<T> RecordingSink<T> {
    pub fn new() -> Self {
        Self { observations: Vec::new() }
    }
}

impl<T> Default for RecordingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Observer<T> for RecordingSink<T> {
    fn observe(&mut self, event: &T, ack: &Ack) {
        self.observations.push((event.clone(), *ack));
    }
}

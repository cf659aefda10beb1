//! Admission-gated consumer.
//!
//! One call to [`Executor::process`] pulls at most one event. The lifecycle
//! is sampled at the start of every call, so a transition made between two
//! calls decides the very next event. Only `Ready` admits execution;
//! `WarmingUp` and `Degraded` consume the event and mark it not executed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::bus::{Reader, RingBuffer};
use super::clock::{Clock, MonotonicClock};
use super::error::{ExecError, NotReady};
use super::lifecycle::{Lifecycle, State};
use super::observe::{NoopSink, Observer};

/// Outcome of consuming one event. Handed to the caller, never kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub seq: u64,
    pub decision_ts: u64,
    pub completion_ts: u64,
    pub executed: bool,
}

impl Ack {
    pub fn latency_ns(&self) -> u64 {
        self.completion_ts.saturating_sub(self.decision_ts)
    }
}

pub struct Executor<T, S = NoopSink> {
    reader: Reader<T>,
    lifecycle: Arc<Lifecycle>,
    sink: S,
    clock: Arc<dyn Clock>,
}

impl<T> Executor<T, NoopSink> {
    /// Joins the bus at its current head with a no-op sink and a monotonic clock.
    pub fn new(bus: &Arc<RingBuffer<T>>, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            reader: Reader::new(bus),
            lifecycle,
            sink: NoopSink,
            clock: Arc::new(MonotonicClock::new()),
        }
    }
}

impl<T, S> Executor<T, S> {
    pub fn with_sink<S2>(self, sink: S2) -> Executor<T, S2> {
        Executor {
            reader: self.reader,
            lifecycle: self.lifecycle,
            sink,
            clock: self.clock,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cursor(&self) -> u64 {
        self.reader.cursor()
    }

    pub fn available(&self) -> u64 {
        self.reader.available()
    }

    /// Skip the unread backlog. Callers use this to leave an overrun.
    pub fn resync(&mut self) {
        self.reader.reset_to_head();
    }

    pub fn lifecycle(&self) -> &Arc<Lifecycle> {
        &self.lifecycle
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<T: Clone, S: Observer<T>> Executor<T, S> {
    pub fn process(&mut self) -> Result<Option<Ack>, ExecError> {
        let state = self.lifecycle.current();
        if state == State::Init {
            return Err(NotReady { state }.into());
        }

        let seq = self.reader.cursor();
        let event = match self.reader.poll()? {
            Some(event) => event,
            None => return Ok(None),
        };

        let decision_ts = self.clock.now();
        let executed = state == State::Ready;
        let completion_ts = self.clock.now().max(decision_ts);

        let ack = Ack { seq, decision_ts, completion_ts, executed };
        self.sink.observe(&event, &ack);
        Ok(Some(ack))
    }
}

impl<T, S> std::fmt::Debug for Executor<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("cursor", &self.reader.cursor())
            .field("state", &self.lifecycle.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;
    use crate::engine::error::BusError;
    use crate::engine::observe::RecordingSink;

    fn setup(capacity: usize) -> (Arc<RingBuffer<u32>>, Arc<Lifecycle>) {
        (RingBuffer::shared(capacity), Arc::new(Lifecycle::new()))
    }

    fn warm(lc: &Lifecycle) {
        lc.transition(State::WarmingUp).unwrap();
    }

    fn ready(lc: &Lifecycle) {
        warm(lc);
        lc.transition(State::Ready).unwrap();
    }

    #[test]
    fn test_not_ready_in_init_does_not_consume() {
        let (bus, lc) = setup(8);
        let mut ex = Executor::new(&bus, Arc::clone(&lc));
        bus.publish(1);
        let err = ex.process().unwrap_err();
        assert_eq!(err, ExecError::NotReady(NotReady { state: State::Init }));
        assert_eq!(ex.cursor(), 0);
        assert_eq!(ex.available(), 1);
    }

    #[test]
    fn test_executed_only_in_ready() {
        let (bus, lc) = setup(8);
        let mut ex = Executor::new(&bus, Arc::clone(&lc));

        warm(&lc);
        bus.publish(1);
        assert!(!ex.process().unwrap().unwrap().executed);

        lc.transition(State::Ready).unwrap();
        bus.publish(2);
        assert!(ex.process().unwrap().unwrap().executed);

        lc.transition(State::Degraded).unwrap();
        bus.publish(3);
        let ack = ex.process().unwrap().unwrap();
        assert!(!ack.executed);
        assert_eq!(ack.seq, 2);
        assert_eq!(ex.cursor(), 3);
    }

    #[test]
    fn test_empty_poll_is_not_observed() {
        let (bus, lc) = setup(8);
        ready(&lc);
        let mut ex = Executor::new(&bus, lc).with_sink(RecordingSink::new());
        assert_eq!(ex.process(), Ok(None));
        assert_eq!(ex.process(), Ok(None));
        assert!(ex.sink().observations.is_empty());
    }

    #[test]
    fn test_observer_sees_event_and_returned_ack() {
        let (bus, lc) = setup(8);
        ready(&lc);
        let mut ex = Executor::new(&bus, lc).with_sink(RecordingSink::new());
        bus.publish(42);
        let ack = ex.process().unwrap().unwrap();
        assert_eq!(ex.sink().observations, vec![(42, ack)]);
        assert_eq!(ack.seq, 0);
    }

    #[test]
    fn test_timestamps_come_from_injected_clock() {
        let (bus, lc) = setup(8);
        ready(&lc);
        let clock = Arc::new(ManualClock::stepping(1_000, 7));
        let mut ex = Executor::new(&bus, lc).with_clock(clock);
        bus.publish(5);
        bus.publish(6);
        let first = ex.process().unwrap().unwrap();
        let second = ex.process().unwrap().unwrap();
        assert_eq!((first.decision_ts, first.completion_ts), (1_000, 1_007));
        assert_eq!(first.latency_ns(), 7);
        assert!(second.decision_ts >= first.completion_ts);
    }

    #[test]
    fn test_overrun_propagates_and_stalls_until_resync() {
        let (bus, lc) = setup(2);
        warm(&lc);
        let mut ex = Executor::new(&bus, lc).with_sink(RecordingSink::new());
        for i in 0..5 {
            bus.publish(i);
        }
        for _ in 0..2 {
            let err = ex.process().unwrap_err();
            assert_eq!(err, ExecError::Bus(BusError::Overrun { seq: 0, head: 5, capacity: 2 }));
            assert_eq!(ex.cursor(), 0);
        }
        ex.resync();
        assert_eq!(ex.process(), Ok(None));
        bus.publish(9);
        assert_eq!(ex.process().unwrap().unwrap().seq, 5);
        assert_eq!(ex.sink().observations.len(), 1);
    }

    #[test]
    fn test_late_executor_ignores_history() {
        let (bus, lc) = setup(8);
        ready(&lc);
        bus.publish(1);
        bus.publish(2);
        let mut ex = Executor::new(&bus, lc);
        assert_eq!(ex.cursor(), 2);
        assert_eq!(ex.process(), Ok(None));
    }
}

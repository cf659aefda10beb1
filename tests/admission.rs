//! Executor admission: `executed` is decided per event from the lifecycle
//! state sampled at the moment of the call.

use std::sync::Arc;

use hotpath::control::LatencyMetrics;
use hotpath::engine::{
    ExecError, Executor, Lifecycle, ManualClock, NotReady, RecordingSink, RingBuffer, State,
};
use hotpath::runtime::{ShutdownController, WarmUpController};

fn pipeline(capacity: usize) -> (Arc<RingBuffer<u64>>, Arc<Lifecycle>) {
    (RingBuffer::shared(capacity), Arc::new(Lifecycle::new()))
}

#[test]
fn test_warmup_then_ready_scenario() {
    let (bus, lc) = pipeline(16);
    lc.transition(State::WarmingUp).unwrap();
    let mut ex = Executor::new(&bus, Arc::clone(&lc));

    bus.publish(1);
    let ack = ex.process().unwrap().unwrap();
    assert!(!ack.executed);

    lc.transition(State::Ready).unwrap();
    bus.publish(2);
    let ack = ex.process().unwrap().unwrap();
    assert!(ack.executed);
    assert_eq!(ack.seq, 1);
}

#[test]
fn test_executed_matches_state_at_call_time() {
    let (bus, lc) = pipeline(64);
    let mut ex = Executor::new(&bus, Arc::clone(&lc)).with_sink(RecordingSink::new());
    let mut warmup = WarmUpController::new(Arc::clone(&lc), 2);
    let shutdown = ShutdownController::new(Arc::clone(&lc));

    for i in 0..10 {
        bus.publish(i);
    }
    assert_eq!(
        ex.process(),
        Err(ExecError::NotReady(NotReady { state: State::Init }))
    );
    assert_eq!(ex.cursor(), 0);

    warmup.start().unwrap();
    let mut expected = Vec::new();
    for step in 0..10 {
        match step {
            2 => {
                warmup.tick();
                warmup.tick();
                assert!(warmup.complete().unwrap());
            }
            5 => assert!(shutdown.degrade().unwrap()),
            7 => assert!(shutdown.recover().unwrap()),
            _ => {}
        }
        let state = lc.current();
        let ack = ex.process().unwrap().unwrap();
        assert_eq!(ack.executed, state == State::Ready, "step {step} in {state}");
        expected.push(ack);
    }
    assert_eq!(ex.process(), Ok(None));

    let observed: Vec<_> = ex.sink().observations.iter().map(|(_, ack)| *ack).collect();
    assert_eq!(observed, expected);
    let events: Vec<u64> = ex.sink().observations.iter().map(|(e, _)| *e).collect();
    assert_eq!(events, (0..10).collect::<Vec<_>>());
}

#[test]
fn test_independent_executors_over_one_bus() {
    let (bus, lc) = pipeline(8);
    lc.transition(State::WarmingUp).unwrap();
    lc.transition(State::Ready).unwrap();
    let mut a = Executor::new(&bus, Arc::clone(&lc));
    let mut b = Executor::new(&bus, Arc::clone(&lc));
    for i in 0..4 {
        bus.publish(i);
    }
    for _ in 0..4 {
        a.process().unwrap();
    }
    b.process().unwrap();
    assert_eq!(a.cursor(), 4);
    assert_eq!(b.cursor(), 1);
    assert_eq!(b.available(), 3);
}

#[test]
fn test_metrics_sink_aggregates_exact_latencies() {
    let (bus, lc) = pipeline(8);
    lc.transition(State::WarmingUp).unwrap();
    let clock = Arc::new(ManualClock::stepping(0, 3));
    let mut ex = Executor::new(&bus, lc)
        .with_clock(clock)
        .with_sink(LatencyMetrics::new());
    for i in 0..5 {
        bus.publish(i);
        ex.process().unwrap();
    }
    assert_eq!(ex.process(), Ok(None));
    let snap = ex.into_sink().snapshot();
    assert_eq!(snap.count, 5);
    assert_eq!(snap.total_latency_ns, 15);
    assert_eq!((snap.min_latency_ns, snap.max_latency_ns), (3, 3));
}

#[test]
fn test_overrun_requires_explicit_resync() {
    let (bus, lc) = pipeline(4);
    lc.transition(State::WarmingUp).unwrap();
    let mut ex = Executor::new(&bus, lc).with_sink((LatencyMetrics::new(), RecordingSink::new()));
    for i in 0..9 {
        bus.publish(i);
    }
    for _ in 0..3 {
        assert!(ex.process().unwrap_err().is_overrun());
    }
    assert_eq!(ex.cursor(), 0);
    ex.resync();
    bus.publish(100);
    let ack = ex.process().unwrap().unwrap();
    assert_eq!(ack.seq, 9);
    assert_eq!(ex.sink().0.snapshot().count, 1);
    assert_eq!(ex.sink().1.observations, vec![(100, ack)]);
}

#[test]
fn test_lifecycle_shared_across_threads() {
    let lc = Arc::new(Lifecycle::new());
    lc.transition(State::WarmingUp).unwrap();
    lc.transition(State::Ready).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let lc = Arc::clone(&lc);
            std::thread::spawn(move || {
                for _ in 0..10_000 {
                    assert!(matches!(lc.current(), State::Ready | State::Degraded));
                }
            })
        })
        .collect();
    for _ in 0..1_000 {
        lc.transition(State::Degraded).unwrap();
        lc.transition(State::Ready).unwrap();
    }
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(lc.current(), State::Ready);
}

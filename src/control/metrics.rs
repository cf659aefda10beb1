//! Latency accumulator fed by executor acknowledgments.

use serde::{Deserialize, Serialize};

use crate::engine::{Ack, Observer};

/// Point-in-time copy of the accumulator. All zeros before the first sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub count: u64,
    pub total_latency_ns: u64,
    pub min_latency_ns: u64,
    pub max_latency_ns: u64,
}

impl Snapshot {
    pub fn mean_latency_ns(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_latency_ns as f64 / self.count as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct LatencyMetrics {
    count: u64,
    total: u64,
    min: u64,
    max: u64,
}

impl LatencyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, latency_ns: u64) {
        if self.count == 0 {
            self.min = latency_ns;
            self.max = latency_ns;
        } else {
            self.min = self.min.min(latency_ns);
            self.max = self.max.max(latency_ns);
        }
        self.count += 1;
        self.total = self.total.saturating_add(latency_ns);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            count: self.count,
            total_latency_ns: self.total,
            min_latency_ns: self.min,
            max_latency_ns: self.max,
        }
    }

    /// Returns the snapshot taken just before clearing.
    pub fn reset(&mut self) -> Snapshot {
        let snap = self.snapshot();
        *self = Self::default();
        snap
    }
}

impl<T> Observer<T> for LatencyMetrics {
    fn observe(&mut self, _event: &T, ack: &Ack) {
        LatencyMetrics::observe(self, ack.latency_ns());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot_zeros() {
        let m = LatencyMetrics::new();
        assert_eq!(m.snapshot(), Snapshot::default());
        assert_eq!(m.snapshot().mean_latency_ns(), 0.0);
    }

    #[test]
    fn test_first_observation_sets_min_max() {
        let mut m = LatencyMetrics::new();
        m.observe(500);
        assert_eq!(
            m.snapshot(),
            Snapshot { count: 1, total_latency_ns: 500, min_latency_ns: 500, max_latency_ns: 500 }
        );
    }

    #[test]
    fn test_min_max_and_mean() {
        let mut m = LatencyMetrics::new();
        for v in [300, 100, 900, 500] {
            m.observe(v);
        }
        let s = m.snapshot();
        assert_eq!((s.count, s.total_latency_ns), (4, 1_800));
        assert_eq!((s.min_latency_ns, s.max_latency_ns), (100, 900));
        assert_eq!(s.mean_latency_ns(), 450.0);
    }

    #[test]
    fn test_reset_returns_then_clears() {
        let mut m = LatencyMetrics::new();
        m.observe(10);
        m.observe(20);
        let before = m.reset();
        assert_eq!(before.count, 2);
        assert_eq!(m.snapshot(), Snapshot::default());
        m.observe(7);
        assert_eq!(m.snapshot().min_latency_ns, 7);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut m = LatencyMetrics::new();
        m.observe(1);
        let snap = m.snapshot();
        m.observe(99);
        assert_eq!(snap.count, 1);
        assert_eq!(snap.max_latency_ns, 1);
    }

    #[test]
    fn test_total_saturates() {
        let mut m = LatencyMetrics::new();
        m.observe(u64::MAX);
        m.observe(u64::MAX);
        assert_eq!(m.snapshot().total_latency_ns, u64::MAX);
        assert_eq!(m.snapshot().count, 2);
    }

    #[test]
    fn test_observer_uses_ack_latency() {
        let mut m = LatencyMetrics::new();
        let ack = Ack { seq: 0, decision_ts: 1_000, completion_ts: 1_250, executed: true };
        Observer::<()>::observe(&mut m, &(), &ack);
        assert_eq!(m.snapshot().total_latency_ns, 250);
    }
}

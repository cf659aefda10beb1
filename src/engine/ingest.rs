//! Market data producer bound to the lifecycle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::clock::{Clock, MonotonicClock};
use super::error::NotReady;
use super::lifecycle::{Lifecycle, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Source-local counter, starting at 1. Unrelated to the bus sequence.
    pub seq: u64,
    pub ts: u64,
}

pub struct MarketDataSource {
    seq: u64,
    lifecycle: Arc<Lifecycle>,
    clock: Arc<dyn Clock>,
}

impl MarketDataSource {
    pub fn new(lifecycle: Arc<Lifecycle>) -> Self {
        Self { seq: 0, lifecycle, clock: Arc::new(MonotonicClock::new()) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Refuses while the pipeline is in `Init`; emits in every other state.
    pub fn emit(&mut self) -> Result<MarketEvent, NotReady> {
        let state = self.lifecycle.current();
        if state == State::Init {
            return Err(NotReady { state });
        }
        self.seq += 1;
        Ok(MarketEvent { seq: self.seq, ts: self.clock.now() })
    }

    pub fn emitted(&self) -> u64 {
        self.seq
    }
}

impl std::fmt::Debug for MarketDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataSource").field("seq", &self.seq).finish()
    }
}

use std::sync::Arc;

use serde::Serialize;

use crate::engine::{Lifecycle, State};

/// Read-only view of the lifecycle for health endpoints and reports.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    lifecycle: Arc<Lifecycle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    pub state: State,
    pub ready: bool,
    pub alive: bool,
    pub degraded: bool,
}

impl ReadinessProbe {
    pub fn new(lifecycle: Arc<Lifecycle>) -> Self {
        Self { lifecycle }
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle.current() == State::Ready
    }

    /// The process answering is the liveness signal.
    pub fn is_alive(&self) -> bool {
        true
    }

    pub fn is_degraded(&self) -> bool {
        self.lifecycle.current() == State::Degraded
    }

    pub fn state_name(&self) -> &'static str {
        self.lifecycle.current().as_str()
    }

    /// Samples the lifecycle once so the fields agree with each other.
    pub fn report(&self) -> ReadinessReport {
        let state = self.lifecycle.current();
        ReadinessReport {
            state,
            ready: state == State::Ready,
            alive: self.is_alive(),
            degraded: state == State::Degraded,
        }
    }
}

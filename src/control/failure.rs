//! Failure injection by forced degradation.
//!
//! An active fault holds the pipeline in `Degraded` and remembers the state
//! it interrupted. Every change goes through [`Lifecycle::transition`], so a
//! restore the table forbids (e.g. `Degraded -> WarmingUp`) is reported back
//! instead of being forced.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{InvalidTransition, Lifecycle, State};
use crate::logging::{log_fault, log_transition, log_transition_rejected};

pub trait FailureScenario {
    fn name(&self) -> &'static str;
    fn activate(&mut self) -> Result<(), InvalidTransition>;
    fn deactivate(&mut self) -> Result<(), InvalidTransition>;
    fn is_active(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    MarketData,
    Execution,
}

impl FaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::MarketData => "market_data_outage",
            FaultKind::Execution => "execution_failure",
        }
    }
}

#[derive(Debug)]
pub struct Outage {
    kind: FaultKind,
    lifecycle: Arc<Lifecycle>,
    previous: Option<State>,
}

impl Outage {
    pub fn new(kind: FaultKind, lifecycle: Arc<Lifecycle>) -> Self {
        Self { kind, lifecycle, previous: None }
    }

    pub fn market_data(lifecycle: Arc<Lifecycle>) -> Self {
        Self::new(FaultKind::MarketData, lifecycle)
    }

    pub fn execution(lifecycle: Arc<Lifecycle>) -> Self {
        Self::new(FaultKind::Execution, lifecycle)
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// State that `deactivate` will try to restore.
    pub fn interrupted(&self) -> Option<State> {
        self.previous
    }
}

impl FailureScenario for Outage {
    fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// No-op when already active or when the pipeline is in `Init`/`Degraded`.
    fn activate(&mut self) -> Result<(), InvalidTransition> {
        if self.previous.is_some() {
            return Ok(());
        }
        let current = self.lifecycle.current();
        if !matches!(current, State::WarmingUp | State::Ready) {
            return Ok(());
        }
        self.lifecycle.transition(State::Degraded).inspect_err(|err| {
            log_transition_rejected(self.name(), err);
        })?;
        log_transition(self.name(), current, State::Degraded);
        self.previous = Some(current);
        log_fault(self.name(), "activated", State::Degraded);
        Ok(())
    }

    /// Restores the interrupted state if the pipeline is still degraded.
    /// A rejected restore leaves the fault active.
    fn deactivate(&mut self) -> Result<(), InvalidTransition> {
        let Some(previous) = self.previous else {
            return Ok(());
        };
        if self.lifecycle.current() == State::Degraded {
            self.lifecycle.transition(previous).inspect_err(|err| {
                log_transition_rejected(self.name(), err);
            })?;
            log_transition(self.name(), State::Degraded, previous);
        }
        self.previous = None;
        log_fault(self.name(), "deactivated", self.lifecycle.current());
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.previous.is_some()
    }
}

//! Named load profiles for the runner.
//!
//! Each scenario fixes the ring size, the per-step producer/consumer balance,
//! the warm-up length, and the steps at which faults are toggled.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the harness does when the executor reports an overrun.
///
/// The engine always propagates and stalls; choosing to skip ahead is the
/// harness's call and is made here, explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrunPolicy {
    /// Count it and leave the reader stuck.
    #[default]
    Stall,
    /// Count it and jump the reader to head.
    Resync,
}

impl OverrunPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrunPolicy::Stall => "stall",
            OverrunPolicy::Resync => "resync",
        }
    }
}

impl fmt::Display for OverrunPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverrunPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stall" => Ok(OverrunPolicy::Stall),
            "resync" => Ok(OverrunPolicy::Resync),
            other => Err(format!("unknown overrun policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Injection {
    ActivateFailure,
    DeactivateFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub ingest_per_step: u64,
    pub polls_per_step: u64,
    pub warmup_ticks: u64,
    pub total_steps: usize,
    pub injections: BTreeMap<usize, Injection>,
    pub ring_capacity: usize,
    pub overrun_policy: OverrunPolicy,
}

impl Scenario {
    pub const DEFAULT_WARMUP_TICKS: u64 = 10;
    pub const DEFAULT_TOTAL_STEPS: usize = 50;
    pub const DEFAULT_RING_CAPACITY: usize = 64;

    pub fn new(name: &str, description: &str, ingest_per_step: u64, polls_per_step: u64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ingest_per_step,
            polls_per_step,
            warmup_ticks: Self::DEFAULT_WARMUP_TICKS,
            total_steps: Self::DEFAULT_TOTAL_STEPS,
            injections: BTreeMap::new(),
            ring_capacity: Self::DEFAULT_RING_CAPACITY,
            overrun_policy: OverrunPolicy::Stall,
        }
    }

    pub fn inject(mut self, step: usize, injection: Injection) -> Self {
        self.injections.insert(step, injection);
        self
    }

    pub fn with_overrun_policy(mut self, policy: OverrunPolicy) -> Self {
        self.overrun_policy = policy;
        self
    }

    pub fn with_ring_capacity(mut self, capacity: usize) -> Self {
        self.ring_capacity = capacity;
        self
    }
}

/// Built-in scenarios, in display order.
pub fn builtin() -> Vec<Scenario> {
    vec![
        Scenario::new("balanced", "Prove stable READY execution with no overruns", 5, 5),
        Scenario::new(
            "producer-heavy",
            "Prove explicit backpressure and deterministic overruns",
            8,
            3,
        ),
        Scenario::new(
            "consumer-heavy",
            "Prove clean behavior under sparse data (empty polls)",
            3,
            8,
        ),
        Scenario::new(
            "failure-recovery",
            "Prove runtime authority, degradation, and recovery",
            5,
            5,
        )
        .inject(20, Injection::ActivateFailure)
        .inject(40, Injection::DeactivateFailure),
        Scenario::new(
            "capacity",
            "Balanced load with a market data outage late in the run",
            5,
            5,
        )
        .inject(40, Injection::ActivateFailure),
    ]
}

pub fn find(name: &str) -> Option<Scenario> {
    builtin().into_iter().find(|s| s.name == name)
}

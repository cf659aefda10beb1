//! Step-driven pipeline runner.
//!
//! Each step, in order:
//! 1. apply the scenario's injection for this step, if any
//! 2. tick warm-up (steps before `warmup_ticks`) or complete it (at `warmup_ticks`)
//! 3. ingest: emit and publish `ingest_per_step` market events
//! 4. execute: call `Executor::process` `polls_per_step` times
//!
//! The runner is the policy layer the engine leaves open: it logs, counts,
//! and applies the scenario's [`OverrunPolicy`].

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::control::{FailureScenario, LatencyMetrics, Outage, Snapshot};
use crate::engine::{
    BusError, Clock, ExecError, Executor, Lifecycle, MarketDataSource, MonotonicClock, RingBuffer,
    State,
};
use crate::logging::{log_latency_snapshot, log_overrun, log_run_summary, log_step, LogSink};
use crate::runtime::WarmUpController;
use crate::scenario::{Injection, OverrunPolicy, Scenario};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: usize,
    pub state: State,
    pub ingested: u64,
    pub polls: u64,
    pub acks: u64,
    pub executed: u64,
    pub empty_polls: u64,
    pub overruns: u64,
    pub resyncs: u64,
    pub rejected_transitions: u64,
    pub metrics: Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenario: String,
    pub ring_capacity: usize,
    pub overrun_policy: OverrunPolicy,
    pub total_ingested: u64,
    pub total_acks: u64,
    pub total_executed: u64,
    pub total_overruns: u64,
    pub final_state: State,
    pub steps: Vec<StepResult>,
}

impl RunSummary {
    pub fn first_overrun_step(&self) -> Option<usize> {
        self.steps.iter().find(|s| s.overruns > 0).map(|s| s.step)
    }

    /// End-of-step state at step 0, then every step where it changed.
    pub fn transitions(&self) -> Vec<(usize, State)> {
        let mut out: Vec<(usize, State)> = Vec::new();
        for s in &self.steps {
            if out.last().map(|(_, prev)| *prev) != Some(s.state) {
                out.push((s.step, s.state));
            }
        }
        out
    }

    pub fn latency(&self) -> Snapshot {
        self.steps.last().map(|s| s.metrics).unwrap_or_default()
    }

    /// SHA-256 over the per-step counters and states. Latencies are left out
    /// so the digest only changes when behavior does.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.scenario.as_bytes());
        for s in &self.steps {
            hasher.update(
                format!(
                    "{}|{}|{}|{}|{}|{}|{}|{}|{}\n",
                    s.step,
                    s.state,
                    s.ingested,
                    s.acks,
                    s.executed,
                    s.empty_polls,
                    s.overruns,
                    s.resyncs,
                    s.rejected_transitions
                )
                .as_bytes(),
            );
        }
        hex::encode(hasher.finalize())
    }

    pub fn write_report(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating report dir {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(self).context("serializing run summary")?;
        std::fs::write(path, body).with_context(|| format!("writing report {}", path.display()))?;
        Ok(())
    }
}

pub struct Runner {
    clock: Arc<dyn Clock>,
}

impl Runner {
    pub fn new() -> Self {
        Self { clock: Arc::new(MonotonicClock::new()) }
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn run(&self, scenario: &Scenario) -> RunSummary {
        let lifecycle = Arc::new(Lifecycle::new());
        let bus = RingBuffer::shared(scenario.ring_capacity);
        let mut source =
            MarketDataSource::new(Arc::clone(&lifecycle)).with_clock(Arc::clone(&self.clock));
        let mut executor = Executor::new(&bus, Arc::clone(&lifecycle))
            .with_clock(Arc::clone(&self.clock))
            .with_sink((LatencyMetrics::new(), LogSink));
        let mut warmup = WarmUpController::new(Arc::clone(&lifecycle), scenario.warmup_ticks);
        let mut outage = Outage::market_data(Arc::clone(&lifecycle));

        let mut rejected = u64::from(warmup.start().is_err());
        let mut steps = Vec::with_capacity(scenario.total_steps);

        for step in 0..scenario.total_steps {
            let mut result = StepResult {
                step,
                state: lifecycle.current(),
                ingested: 0,
                polls: scenario.polls_per_step,
                acks: 0,
                executed: 0,
                empty_polls: 0,
                overruns: 0,
                resyncs: 0,
                rejected_transitions: std::mem::take(&mut rejected),
                metrics: Snapshot::default(),
            };

            let injected = match scenario.injections.get(&step) {
                Some(Injection::ActivateFailure) => outage.activate(),
                Some(Injection::DeactivateFailure) => outage.deactivate(),
                None => Ok(()),
            };
            let warmed = if (step as u64) < scenario.warmup_ticks {
                warmup.tick();
                Ok(false)
            } else if step as u64 == scenario.warmup_ticks {
                warmup.complete()
            } else {
                Ok(false)
            };
            result.rejected_transitions += u64::from(injected.is_err()) + u64::from(warmed.is_err());

            for _ in 0..scenario.ingest_per_step {
                // Only Init refuses, and warm-up has started by now.
                if let Ok(event) = source.emit() {
                    bus.publish(event);
                    result.ingested += 1;
                }
            }

            for _ in 0..scenario.polls_per_step {
                match executor.process() {
                    Ok(Some(ack)) => {
                        result.acks += 1;
                        result.executed += u64::from(ack.executed);
                    }
                    Ok(None) => result.empty_polls += 1,
                    Err(ExecError::Bus(BusError::Overrun { seq, head, .. })) => {
                        result.overruns += 1;
                        log_overrun(&scenario.name, step, seq, head, scenario.overrun_policy.as_str());
                        if scenario.overrun_policy == OverrunPolicy::Resync {
                            executor.resync();
                            result.resyncs += 1;
                        }
                    }
                    // NotReady and InvalidSequence cannot occur after start; count nothing.
                    Err(_) => {}
                }
            }

            result.state = lifecycle.current();
            result.metrics = executor.sink().0.snapshot();
            log_step(&scenario.name, step, result.state, result.acks, result.overruns);
            steps.push(result);
        }

        let summary = RunSummary {
            scenario: scenario.name.clone(),
            ring_capacity: scenario.ring_capacity,
            overrun_policy: scenario.overrun_policy,
            total_ingested: steps.iter().map(|s| s.ingested).sum(),
            total_acks: steps.iter().map(|s| s.acks).sum(),
            total_executed: steps.iter().map(|s| s.executed).sum(),
            total_overruns: steps.iter().map(|s| s.overruns).sum(),
            final_state: lifecycle.current(),
            steps,
        };
        let latency = summary.latency();
        log_latency_snapshot(
            &summary.scenario,
            latency.count,
            latency.mean_latency_ns(),
            latency.max_latency_ns,
        );
        log_run_summary(
            &summary.scenario,
            summary.total_ingested,
            summary.total_acks,
            summary.total_overruns,
            summary.final_state,
        );
        summary
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

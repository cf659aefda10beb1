use anyhow::{bail, Result};

use crate::scenario::{Injection, OverrunPolicy, Scenario};

/// Capacity-run settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ring_capacity: usize,
    pub warmup_ticks: u64,
    pub ingest_per_step: u64,
    pub polls_per_step: u64,
    pub total_steps: usize,
    pub degrade_at_step: Option<usize>,
    pub overrun_policy: OverrunPolicy,
    pub report_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ring_capacity: Scenario::DEFAULT_RING_CAPACITY,
            warmup_ticks: Scenario::DEFAULT_WARMUP_TICKS,
            ingest_per_step: 5,
            polls_per_step: 5,
            total_steps: Scenario::DEFAULT_TOTAL_STEPS,
            degrade_at_step: Some(40),
            overrun_policy: OverrunPolicy::Stall,
            report_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Unset or unparsable values fall back to the defaults.
    /// `DEGRADE_AT_STEP=none` disables the injected outage.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            ring_capacity: var("RING_CAPACITY").and_then(|v| v.parse().ok()).unwrap_or(d.ring_capacity),
            warmup_ticks: var("WARMUP_TICKS").and_then(|v| v.parse().ok()).unwrap_or(d.warmup_ticks),
            ingest_per_step: var("INGEST_PER_STEP").and_then(|v| v.parse().ok()).unwrap_or(d.ingest_per_step),
            polls_per_step: var("POLLS_PER_STEP").and_then(|v| v.parse().ok()).unwrap_or(d.polls_per_step),
            total_steps: var("TOTAL_STEPS").and_then(|v| v.parse().ok()).unwrap_or(d.total_steps),
            degrade_at_step: match var("DEGRADE_AT_STEP").as_deref() {
                Some("none") => None,
                Some(v) => v.parse().ok().or(d.degrade_at_step),
                None => d.degrade_at_step,
            },
            overrun_policy: var("OVERRUN_POLICY").and_then(|v| v.parse().ok()).unwrap_or(d.overrun_policy),
            report_path: var("REPORT_PATH").filter(|v| !v.is_empty()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ring_capacity == 0 {
            bail!("RING_CAPACITY must be at least 1");
        }
        if self.total_steps == 0 {
            bail!("TOTAL_STEPS must be at least 1");
        }
        Ok(())
    }

    pub fn to_scenario(&self) -> Scenario {
        let mut scenario = Scenario::new(
            "capacity",
            "Capacity run configured from the environment",
            self.ingest_per_step,
            self.polls_per_step,
        )
        .with_ring_capacity(self.ring_capacity)
        .with_overrun_policy(self.overrun_policy);
        scenario.warmup_ticks = self.warmup_ticks;
        scenario.total_steps = self.total_steps;
        if let Some(step) = self.degrade_at_step {
            scenario = scenario.inject(step, Injection::ActivateFailure);
        }
        scenario
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_match_capacity_scenario() {
        let cfg = Config::from_vars(vars(&[]));
        assert_eq!(cfg, Config::default());
        let from_cfg = cfg.to_scenario();
        let builtin = crate::scenario::find("capacity").unwrap();
        assert_eq!(from_cfg.injections, builtin.injections);
        assert_eq!(from_cfg.ring_capacity, builtin.ring_capacity);
        assert_eq!(from_cfg.total_steps, builtin.total_steps);
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_vars(vars(&[
            ("RING_CAPACITY", "16"),
            ("POLLS_PER_STEP", "2"),
            ("DEGRADE_AT_STEP", "none"),
            ("OVERRUN_POLICY", "resync"),
            ("REPORT_PATH", "out/capacity.json"),
        ]));
        assert_eq!(cfg.ring_capacity, 16);
        assert_eq!(cfg.polls_per_step, 2);
        assert_eq!(cfg.degrade_at_step, None);
        assert_eq!(cfg.overrun_policy, OverrunPolicy::Resync);
        assert_eq!(cfg.report_path.as_deref(), Some("out/capacity.json"));
        assert!(cfg.to_scenario().injections.is_empty());
    }

    #[test]
    fn test_garbage_falls_back() {
        let cfg = Config::from_vars(vars(&[("RING_CAPACITY", "lots"), ("OVERRUN_POLICY", "drop")]));
        assert_eq!(cfg.ring_capacity, 64);
        assert_eq!(cfg.overrun_policy, OverrunPolicy::Stall);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let cfg = Config { ring_capacity: 0, ..Config::default() };
        assert!(cfg.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}

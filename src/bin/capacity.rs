//! Capacity harness: one configurable run, JSON summary on stdout.
//!
//! Configure with RING_CAPACITY, WARMUP_TICKS, INGEST_PER_STEP, POLLS_PER_STEP,
//! TOTAL_STEPS, DEGRADE_AT_STEP (or `none`), OVERRUN_POLICY (stall|resync).
//! Set REPORT_PATH to also write the summary to a file.
//!
//! Usage: cargo run --release --bin capacity

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use hotpath::config::Config;
use hotpath::logging::{log, obj, run_id, v_str, Domain, Level};
use hotpath::runner::Runner;

fn main() -> Result<()> {
    let cfg = Config::from_env();
    cfg.validate()?;
    log(
        Level::Info,
        Domain::System,
        "capacity_start",
        obj(&[
            ("ring_capacity", json!(cfg.ring_capacity)),
            ("ingest_per_step", json!(cfg.ingest_per_step)),
            ("polls_per_step", json!(cfg.polls_per_step)),
            ("total_steps", json!(cfg.total_steps)),
            ("overrun_policy", v_str(cfg.overrun_policy.as_str())),
        ]),
    );

    let scenario = cfg.to_scenario();
    let summary = Runner::new().run(&scenario);

    let out = json!({
        "run_id": run_id(),
        "fingerprint": summary.fingerprint(),
        "first_overrun_step": summary.first_overrun_step(),
        "latency": summary.latency(),
        "summary": summary,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serializing capacity output")?
    );

    if let Some(path) = &cfg.report_path {
        summary.write_report(Path::new(path))?;
        log(
            Level::Info,
            Domain::System,
            "report_written",
            obj(&[("path", v_str(path))]),
        );
    }
    Ok(())
}

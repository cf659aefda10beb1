//! Scenario demo.
//!
//! Usage: cargo run -- <scenario>

use std::process;

use hotpath::runner::Runner;
use hotpath::scenario::{builtin, find};

fn usage() -> ! {
    eprintln!("Usage: hotpath <scenario>");
    eprintln!("Available scenarios:");
    for s in builtin() {
        eprintln!("  - {}", s.name);
    }
    process::exit(1);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        usage();
    }
    let Some(scenario) = find(&args[1]) else {
        eprintln!("Error: unknown scenario '{}'", args[1]);
        usage();
    };

    println!("Scenario: {}", scenario.name);
    println!("{}", "-".repeat(32));
    println!("Description: {}", scenario.description);
    println!("Ring capacity: {}", scenario.ring_capacity);
    println!(
        "Load: ingest={} / execute={}",
        scenario.ingest_per_step, scenario.polls_per_step
    );
    println!("Overrun policy: {}", scenario.overrun_policy);
    println!();

    let summary = Runner::new().run(&scenario);

    println!("Lifecycle:");
    for (step, state) in summary.transitions() {
        println!("  step {:<3} -> {}", step, state);
    }
    println!();

    println!("Overruns:");
    match summary.first_overrun_step() {
        Some(step) => println!("  first_overrun_step: {}", step),
        None => println!("  first_overrun_step: none"),
    }
    println!("  total_overruns: {}", summary.total_overruns);
    println!();

    let latency = summary.latency();
    println!("Summary:");
    println!("  total_ingested: {}", summary.total_ingested);
    println!("  total_acks: {}", summary.total_acks);
    println!("  total_executed: {}", summary.total_executed);
    println!("  final_state: {}", summary.final_state);
    println!("  mean_ack_latency_ns: {:.1}", latency.mean_latency_ns());
    println!("  fingerprint: {}", summary.fingerprint());
}

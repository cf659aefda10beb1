//! Structured JSON-lines logging for the pipeline harness.
//!
//! Every record is one JSON object on stderr:
//! `{"ts", "run_id", "seq", "lvl", "component", "event", "msg", ..., "data"}`.
//!
//! Environment:
//! - `LOG_LEVEL`: trace | debug | info (default) | warn | error | fatal
//! - `LOG_DOMAINS`: comma-separated domains, or `all` (default)
//! - `LOG_DIR`: when set, records are also appended under `<LOG_DIR>/<run_id>/`
//!   (`events.jsonl` for info and above, `trace.jsonl` for trace/debug)
//! - `RUN_ID`: overrides the generated run id
//!
//! The engine module never logs. Controllers, the runner and the binaries do.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Debug;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::engine::{Ack, InvalidTransition, Observer, State};

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_LEVEL").ok().as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("trace") => Level::Trace,
            Some("debug") => Level::Debug,
            Some("warn") => Level::Warn,
            Some("error") => Level::Error,
            Some("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Lifecycle, // State transitions and rejected transitions
    Bus,       // Overruns, resyncs
    Exec,      // Per-ack records
    Metrics,   // Latency snapshots
    Fault,     // Failure injection
    System,    // Startup, run summaries
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Lifecycle => "lifecycle",
            Domain::Bus => "bus",
            Domain::Exec => "exec",
            Domain::Metrics => "metrics",
            Domain::Fault => "fault",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled_in(std::env::var("LOG_DOMAINS").ok().as_deref())
    }

    fn enabled_in(&self, filter: Option<&str>) -> bool {
        match filter {
            None | Some("all") => true,
            Some(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
    trace: Option<Mutex<BufWriter<File>>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let Ok(base) = std::env::var("LOG_DIR") else {
            return RunContext { run_id, events: None, trace: None };
        };
        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
            return RunContext { run_id, events: None, trace: None };
        }
        let open = |name: &str| match File::create(run_dir.join(name)) {
            Ok(f) => Some(Mutex::new(BufWriter::new(f))),
            Err(err) => {
                eprintln!("[log] failed to create {}: {}", name, err);
                None
            }
        };
        RunContext {
            events: open("events.jsonl"),
            trace: open("trace.jsonl"),
            run_id,
        }
    })
}

fn write_line(writer: &Option<Mutex<BufWriter<File>>>, line: &str) {
    if let Some(writer) = writer {
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

pub fn run_id() -> &'static str {
    &ensure_run_context().run_id
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    let ctx = ensure_run_context();
    let line = build_record(&ctx.run_id, next_seq(), level, domain, event, fields).to_string();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    eprintln!("{}", line);
}

fn build_record(
    run_id: &str,
    seq: u64,
    level: Level,
    domain: Domain,
    event: &str,
    mut fields: Map<String, Value>,
) -> Value {
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(seq));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for key in ["scenario", "step"] {
        if let Some(value) = fields.remove(key) {
            entry.insert(key.to_string(), value);
        }
    }
    entry.insert("data".to_string(), Value::Object(fields));
    Value::Object(entry)
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_transition(controller: &str, from: State, to: State) {
    log(
        Level::Info,
        Domain::Lifecycle,
        "transition",
        obj(&[
            ("controller", v_str(controller)),
            ("from", v_str(from.as_str())),
            ("to", v_str(to.as_str())),
        ]),
    );
}

pub fn log_transition_rejected(controller: &str, err: &InvalidTransition) {
    log(
        Level::Warn,
        Domain::Lifecycle,
        err.as_label(),
        obj(&[
            ("controller", v_str(controller)),
            ("from", v_str(err.from.as_str())),
            ("to", v_str(err.to.as_str())),
            ("msg", v_str(&err.to_string())),
        ]),
    );
}

pub fn log_fault(name: &str, action: &str, state: State) {
    log(
        Level::Info,
        Domain::Fault,
        action,
        obj(&[("fault", v_str(name)), ("state", v_str(state.as_str()))]),
    );
}

pub fn log_overrun(scenario: &str, step: usize, seq: u64, head: u64, policy: &str) {
    log(
        Level::Warn,
        Domain::Bus,
        "overrun",
        obj(&[
            ("scenario", v_str(scenario)),
            ("step", json!(step)),
            ("seq", json!(seq)),
            ("head", json!(head)),
            ("policy", v_str(policy)),
        ]),
    );
}

pub fn log_step(scenario: &str, step: usize, state: State, acks: u64, overruns: u64) {
    log(
        Level::Debug,
        Domain::System,
        "step",
        obj(&[
            ("scenario", v_str(scenario)),
            ("step", json!(step)),
            ("state", v_str(state.as_str())),
            ("acks", json!(acks)),
            ("overruns", json!(overruns)),
        ]),
    );
}

pub fn log_latency_snapshot(scenario: &str, count: u64, mean_ns: f64, max_ns: u64) {
    log(
        Level::Info,
        Domain::Metrics,
        "latency_snapshot",
        obj(&[
            ("scenario", v_str(scenario)),
            ("count", json!(count)),
            ("mean_ns", v_num(mean_ns)),
            ("max_ns", json!(max_ns)),
        ]),
    );
}

pub fn log_run_summary(scenario: &str, ingested: u64, acks: u64, overruns: u64, final_state: State) {
    log(
        Level::Info,
        Domain::System,
        "run_summary",
        obj(&[
            ("scenario", v_str(scenario)),
            ("ingested", json!(ingested)),
            ("acks", json!(acks)),
            ("overruns", json!(overruns)),
            ("final_state", v_str(final_state.as_str())),
        ]),
    );
}

// =============================================================================
// Ack observer
// =============================================================================

/// Observer that writes one trace record per acknowledgment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl<T: Debug> Observer<T> for LogSink {
    fn observe(&mut self, event: &T, ack: &Ack) {
        log(
            Level::Trace,
            Domain::Exec,
            "ack",
            obj(&[
                ("seq", json!(ack.seq)),
                ("executed", json!(ack.executed)),
                ("latency_ns", json!(ack.latency_ns())),
                ("event", v_str(&format!("{:?}", event))),
            ]),
        );
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Tests
// =============================================================================

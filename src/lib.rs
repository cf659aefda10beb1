//! Admission-gated hot path for a trading pipeline.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ MarketData   │────►│  RingBuffer  │────►│   Executor   │──► Ack ──► Observer
//! │ Source       │     │  (seq, C)    │     │ (per-event)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                                                  ▲
//!        WarmUp / Shutdown / Outage ──transition──► Lifecycle
//! ```
//!
//! [`engine`] holds the invariants: monotonic sequencing, exact overrun
//! detection, and the lifecycle transition table. Everything else drives it.

pub mod config;
pub mod control;
pub mod engine;
pub mod logging;
pub mod runner;
pub mod runtime;
pub mod scenario;

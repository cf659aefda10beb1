//! Hot-path core: lifecycle gate, ring bus, and admission executor.
//!
//! ```text
//!   producer ──publish──► RingBuffer ──poll──► Reader ──► Executor ──► Ack
//!                                                            │          │
//!                                      Lifecycle::current ───┘          ▼
//!                                                                   Observer
//! ```
//!
//! Nothing in here logs, retries, or sleeps. Every failure is a typed error
//! returned to the immediate caller.

pub mod bus;
pub mod clock;
pub mod error;
pub mod executor;
pub mod ingest;
pub mod lifecycle;
pub mod observe;

pub use bus::{Reader, RingBuffer};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{BusError, ExecError, InvalidTransition, NotReady};
pub use executor::{Ack, Executor};
pub use ingest::{MarketDataSource, MarketEvent};
pub use lifecycle::{Lifecycle, State};
pub use observe::{NoopSink, Observer, RecordingSink};

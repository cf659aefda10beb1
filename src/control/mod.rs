pub mod failure;
pub mod metrics;

pub use failure::{FailureScenario, FaultKind, Outage};
pub use metrics::{LatencyMetrics, Snapshot};

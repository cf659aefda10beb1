//! Lifecycle controllers that sit outside the hot path.

pub mod readiness;
pub mod shutdown;
pub mod warmup;

pub use readiness::{ReadinessProbe, ReadinessReport};
pub use shutdown::ShutdownController;
pub use warmup::WarmUpController;

//! Typed failures raised by the hot-path core.
//!
//! Every error here is local to the call that produced it. None of them is
//! fatal and the core never retries or logs them; the caller decides.

use thiserror::Error;

use super::lifecycle::State;

/// A state change that is not in the lifecycle transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid lifecycle transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: State,
    pub to: State,
}

impl InvalidTransition {
    pub fn as_label(&self) -> &'static str {
        "invalid_transition"
    }
}

/// Read failures on the ring store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    /// Sequence has not been published yet.
    #[error("sequence {seq} not yet published (head {head})")]
    InvalidSequence { seq: u64, head: u64 },

    /// The slot for `seq` has been overwritten by a later publish.
    #[error("sequence {seq} overrun: head {head} is more than {capacity} slots ahead")]
    Overrun { seq: u64, head: u64, capacity: u64 },
}

impl BusError {
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::InvalidSequence { .. } => "invalid_sequence",
            BusError::Overrun { .. } => "overrun",
        }
    }

    pub fn is_overrun(&self) -> bool {
        matches!(self, BusError::Overrun { .. })
    }
}

/// An operation that needs a started lifecycle was attempted in `Init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pipeline not started (lifecycle is {state})")]
pub struct NotReady {
    pub state: State,
}

/// Failures of [`Executor::process`](super::executor::Executor::process).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error(transparent)]
    NotReady(#[from] NotReady),

    #[error(transparent)]
    Bus(#[from] BusError),
}

impl ExecError {
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecError::NotReady(_) => "not_ready",
            ExecError::Bus(err) => err.as_label(),
        }
    }

    pub fn is_overrun(&self) -> bool {
        matches!(self, ExecError::Bus(err) if err.is_overrun())
    }
}

//! Finite-state admission gate.
//!
//! ```text
//!   Init ──► WarmingUp ──► Ready ◄──► Degraded
//!                 │                      ▲
//!                 └──────────────────────┘
//! ```
//!
//! The table in [`State::can_transition_to`] is the only authority on which
//! moves are legal. Controllers never assign a state directly.

use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::error::InvalidTransition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    #[serde(rename = "INIT")]
    Init,
    #[serde(rename = "WARMUP")]
    WarmingUp,
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "DEGRADED")]
    Degraded,
}

impl State {
    pub const ALL: [State; 4] = [State::Init, State::WarmingUp, State::Ready, State::Degraded];

    pub fn as_str(&self) -> &'static str {
        match self {
            State::Init => "INIT",
            State::WarmingUp => "WARMUP",
            State::Ready => "READY",
            State::Degraded => "DEGRADED",
        }
    }

    pub fn can_transition_to(self, to: State) -> bool {
        matches!(
            (self, to),
            (State::Init, State::WarmingUp)
                | (State::WarmingUp, State::Ready)
                | (State::WarmingUp, State::Degraded)
                | (State::Ready, State::Degraded)
                | (State::Degraded, State::Ready)
        )
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current pipeline state behind a read-mostly lock.
///
/// Share it as `Arc<Lifecycle>`; readers call [`current`](Self::current) on
/// every event while a single controller requests the rare transitions.
#[derive(Debug)]
pub struct Lifecycle {
    state: RwLock<State>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { state: RwLock::new(State::Init) }
    }

    pub fn current(&self) -> State {
        // State is Copy, so a poisoned lock still holds a valid value.
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Check and apply under one write lock. On failure the state is untouched.
    pub fn transition(&self, to: State) -> Result<(), InvalidTransition> {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        let from = *guard;
        if !from.can_transition_to(to) {
            return Err(InvalidTransition { from, to });
        }
        *guard = to;
        Ok(())
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

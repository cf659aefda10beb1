use std::sync::Arc;

use crate::engine::{InvalidTransition, Lifecycle, State};
use crate::logging::{log_transition, log_transition_rejected};

const CONTROLLER: &str = "warmup";

/// Counts warm-up ticks and promotes the pipeline to `Ready` once enough
/// have elapsed. Ticks only count while the lifecycle is `WarmingUp`.
#[derive(Debug)]
pub struct WarmUpController {
    lifecycle: Arc<Lifecycle>,
    steps: u64,
    current_step: u64,
}

impl WarmUpController {
    pub fn new(lifecycle: Arc<Lifecycle>, steps: u64) -> Self {
        Self { lifecycle, steps, current_step: 0 }
    }

    /// `Init -> WarmingUp`. Does nothing from any other state.
    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        if self.lifecycle.current() != State::Init {
            return Ok(());
        }
        self.move_to(State::Init, State::WarmingUp)
    }

    pub fn tick(&mut self) {
        if self.lifecycle.current() != State::WarmingUp {
            return;
        }
        if self.current_step < self.steps {
            self.current_step += 1;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_step >= self.steps
    }

    pub fn progress(&self) -> (u64, u64) {
        (self.current_step, self.steps)
    }

    /// `WarmingUp -> Ready` once complete. Returns whether it promoted.
    pub fn complete(&mut self) -> Result<bool, InvalidTransition> {
        if !self.is_complete() || self.lifecycle.current() != State::WarmingUp {
            return Ok(false);
        }
        self.move_to(State::WarmingUp, State::Ready)?;
        Ok(true)
    }

    fn move_to(&self, from: State, to: State) -> Result<(), InvalidTransition> {
        match self.lifecycle.transition(to) {
            Ok(()) => {
                log_transition(CONTROLLER, from, to);
                Ok(())
            }
            Err(err) => {
                log_transition_rejected(CONTROLLER, &err);
                Err(err)
            }
        }
    }
}

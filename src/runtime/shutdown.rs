use std::sync::Arc;

use crate::engine::{InvalidTransition, Lifecycle, State};
use crate::logging::{log_transition, log_transition_rejected};

const CONTROLLER: &str = "shutdown";

/// Operator-facing stop/resume switch. Degrading stops execution without
/// stopping consumption.
#[derive(Debug)]
pub struct ShutdownController {
    lifecycle: Arc<Lifecycle>,
}

impl ShutdownController {
    pub fn new(lifecycle: Arc<Lifecycle>) -> Self {
        Self { lifecycle }
    }

    /// `WarmingUp | Ready -> Degraded`. Returns whether a transition happened.
    pub fn degrade(&self) -> Result<bool, InvalidTransition> {
        let current = self.lifecycle.current();
        if !matches!(current, State::WarmingUp | State::Ready) {
            return Ok(false);
        }
        self.apply(current, State::Degraded)
    }

    /// `Degraded -> Ready`. Returns whether a transition happened.
    pub fn recover(&self) -> Result<bool, InvalidTransition> {
        if self.lifecycle.current() != State::Degraded {
            return Ok(false);
        }
        self.apply(State::Degraded, State::Ready)
    }

    fn apply(&self, from: State, to: State) -> Result<bool, InvalidTransition> {
        if let Err(err) = self.lifecycle.transition(to) {
            log_transition_rejected(CONTROLLER, &err);
            return Err(err);
        }
        log_transition(CONTROLLER, from, to);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrade_and_recover() {
        let lc = Arc::new(Lifecycle::new());
        let ctrl = ShutdownController::new(Arc::clone(&lc));
        assert_eq!(ctrl.degrade(), Ok(false));
        assert_eq!(lc.current(), State::Init);

        lc.transition(State::WarmingUp).unwrap();
        assert_eq!(ctrl.degrade(), Ok(true));
        assert_eq!(ctrl.degrade(), Ok(false));
        assert_eq!(lc.current(), State::Degraded);

        assert_eq!(ctrl.recover(), Ok(true));
        assert_eq!(lc.current(), State::Ready);
        assert_eq!(ctrl.recover(), Ok(false));
    }
}

//! Run lifecycle states.

use log::debug;

/// Stage of a single reconnaissance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, nothing started yet
    Idle,
    /// Collecting candidate hostnames
    Discovering,
    /// Probing candidates
    Validating,
    /// Building and writing the report
    Reporting,
    /// Every requested report was written
    Completed,
    /// Stopped by a structural error
    Failed,
}

impl RunState {
    /// Whether `self -> next` is a legal step. Any non-terminal state may fail.
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Discovering)
                | (Discovering, Validating)
                | (Validating, Reporting)
                | (Reporting, Completed)
                | (Idle | Discovering | Validating | Reporting, Failed)
        )
    }

    /// True for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}

/// Tracks the state of one run and logs each transition.
#[derive(Debug)]
pub(crate) struct RunTracker {
    domain: String,
    state: RunState,
}

impl RunTracker {
    pub(crate) fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            state: RunState::Idle,
        }
    }

    pub(crate) fn state(&self) -> RunState {
        self.state
    }

    /// Moves to `next`. Illegal steps are logged and ignored.
    pub(crate) fn advance(&mut self, next: RunState) {
        if self.state.can_advance_to(next) {
            debug!("[{}] {:?} -> {:?}", self.domain, self.state, next);
            self.state = next;
        } else {
            log::error!(
                "[{}] ignored illegal transition {:?} -> {:?}",
                self.domain,
                self.state,
                next
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut tracker = RunTracker::new("example.com");
        for next in [
            RunState::Discovering,
            RunState::Validating,
            RunState::Reporting,
            RunState::Completed,
        ] {
            tracker.advance(next);
            assert_eq!(tracker.state(), next);
        }
        assert!(tracker.state().is_terminal());
    }

    #[test]
    fn test_illegal_transitions_are_ignored() {
        let mut tracker = RunTracker::new("example.com");
        tracker.advance(RunState::Reporting);
        assert_eq!(tracker.state(), RunState::Idle);

        tracker.advance(RunState::Failed);
        assert_eq!(tracker.state(), RunState::Failed);
        tracker.advance(RunState::Discovering);
        assert_eq!(tracker.state(), RunState::Failed);
    }

    #[test]
    fn test_terminal_states_cannot_fail_again() {
        assert!(!RunState::Completed.can_advance_to(RunState::Failed));
        assert!(!RunState::Failed.can_advance_to(RunState::Failed));
        assert!(RunState::Validating.can_advance_to(RunState::Failed));
    }
}

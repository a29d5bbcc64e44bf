use std::time::{Duration, Instant};

use super::{ProbeError, ProbeStage};

/// Time budget shared by every step of one SMTP session.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub(crate) fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left for `stage`, or a timeout error once the budget is spent.
    pub(crate) fn remaining(&self, stage: ProbeStage) -> Result<Duration, ProbeError> {
        self.budget
            .checked_sub(self.started.elapsed())
            .filter(|left| !left.is_zero())
            .ok_or(ProbeError::Timeout {
                stage,
                budget: self.budget,
            })
    }
}

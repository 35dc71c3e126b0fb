use std::fmt;
use std::time::Duration;

/// Where a run currently is in its attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Attempting,
    Waiting,
    Resolved,
}

impl ExecutorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutorState::Idle => "idle",
            ExecutorState::Attempting => "attempting",
            ExecutorState::Waiting => "waiting",
            ExecutorState::Resolved => "resolved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(ExecutorState::Idle),
            "attempting" => Some(ExecutorState::Attempting),
            "waiting" => Some(ExecutorState::Waiting),
            "resolved" => Some(ExecutorState::Resolved),
            _ => None,
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: ExecutorState) -> bool {
        use ExecutorState::*;
        matches!(
            (self, next),
            (Idle, Attempting)
                | (Idle, Resolved)
                | (Attempting, Resolved)
                | (Attempting, Waiting)
                | (Waiting, Attempting)
                | (Waiting, Resolved)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutorState::Resolved)
    }
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Succeeded,
    TransientFailure,
    FatalFailure,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Succeeded => "succeeded",
            AttemptStatus::TransientFailure => "transient-failure",
            AttemptStatus::FatalFailure => "fatal-failure",
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One invocation within a run. Lives only as long as the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based.
    pub index: usize,
    pub status: AttemptStatus,
    /// Clock reading taken at the boundary that admitted the attempt.
    pub started_at: Duration,
}

#[cfg(test)]
mod tests;

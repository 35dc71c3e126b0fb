use std::error::Error;
use std::time::Duration;

use thiserror::Error;

/// Boxed error carried by operation failures.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Raised while building an executor, before any attempt is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// How a single invocation of an operation failed.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Counts against the budget and permits another attempt.
    #[error("transient failure: {0}")]
    Transient(#[source] BoxError),
    /// The operation ran but produced nothing usable yet.
    #[error("no usable result")]
    NotReady,
    /// Stops the run regardless of the remaining budget.
    #[error("fatal failure: {0}")]
    Fatal(#[source] BoxError),
}

impl OperationError {
    pub fn transient(err: impl Into<BoxError>) -> Self {
        OperationError::Transient(err.into())
    }

    pub fn fatal(err: impl Into<BoxError>) -> Self {
        OperationError::Fatal(err.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, OperationError::Fatal(_))
    }
}

// Unclassified errors are treated as transient.
impl From<BoxError> for OperationError {
    fn from(err: BoxError) -> Self {
        OperationError::Transient(err)
    }
}

impl From<std::io::Error> for OperationError {
    fn from(err: std::io::Error) -> Self {
        OperationError::Transient(Box::new(err))
    }
}

/// Terminal failure of a run.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("gave up on {target} after {attempts} attempt(s)")]
    ExhaustedByCount {
        target: String,
        attempts: usize,
        #[source]
        last_error: Option<OperationError>,
    },
    #[error("timed out polling {target} after {attempts} attempt(s) ({timeout:?})")]
    ExhaustedByDeadline {
        target: String,
        attempts: usize,
        timeout: Duration,
        #[source]
        last_error: Option<OperationError>,
    },
    #[error("non-retryable failure on {target} at attempt {attempt}")]
    Fatal {
        target: String,
        attempt: usize,
        #[source]
        source: OperationError,
    },
    #[error("run on {target} cancelled after {attempts} attempt(s)")]
    Cancelled { target: String, attempts: usize },
}

impl Failure {
    /// Number of invocations made before the run resolved.
    pub fn attempts(&self) -> usize {
        match self {
            Failure::ExhaustedByCount { attempts, .. }
            | Failure::ExhaustedByDeadline { attempts, .. }
            | Failure::Cancelled { attempts, .. } => *attempts,
            Failure::Fatal { attempt, .. } => *attempt,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Failure::ExhaustedByCount { .. } => "exhausted-by-count",
            Failure::ExhaustedByDeadline { .. } => "exhausted-by-deadline",
            Failure::Fatal { .. } => "fatal",
            Failure::Cancelled { .. } => "cancelled",
        }
    }
}

/// Terminal result of one run.
pub type Outcome<V> = Result<V, Failure>;

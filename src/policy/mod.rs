use std::time::Duration;

use crate::error::ExecutorError;

pub mod config;

pub use config::PolicyConfig;

/// Default time budget for deadline polling.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default spacing between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bounds the number of invocations: one initial attempt plus `max_retries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountPolicy {
    pub max_retries: usize,
    pub retry_delay: Duration,
}

impl Default for CountPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::ZERO,
        }
    }
}

impl CountPolicy {
    pub fn new(max_retries: usize, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    pub fn with_max_retries(mut self, value: usize) -> Self {
        self.max_retries = value;
        self
    }

    pub fn with_retry_delay(mut self, value: Duration) -> Self {
        self.retry_delay = value;
        self
    }

    /// Total invocations allowed, including the first.
    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }
}

/// When a deadline policy stops polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Relative to the clock reading taken when the run starts.
    Timeout(Duration),
    /// Absolute reading of the executor's clock.
    At(Duration),
}

/// Polls at a fixed interval while the clock is at or before the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlinePolicy {
    pub deadline: Deadline,
    pub poll_interval: Duration,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            deadline: Deadline::Timeout(DEFAULT_TIMEOUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl DeadlinePolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            deadline: Deadline::Timeout(timeout),
            poll_interval,
        }
    }

    pub fn until(deadline: Duration, poll_interval: Duration) -> Self {
        Self {
            deadline: Deadline::At(deadline),
            poll_interval,
        }
    }

    pub fn with_timeout(mut self, value: Duration) -> Self {
        self.deadline = Deadline::Timeout(value);
        self
    }

    pub fn with_poll_interval(mut self, value: Duration) -> Self {
        self.poll_interval = value;
        self
    }

    /// Resolves the absolute deadline for a run that started at `start`.
    pub fn deadline_from(&self, start: Duration) -> Duration {
        match self.deadline {
            Deadline::Timeout(timeout) => start.saturating_add(timeout),
            Deadline::At(at) => at,
        }
    }
}

/// The rule that decides when a run stops retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    Count(CountPolicy),
    Deadline(DeadlinePolicy),
}

impl ExhaustionPolicy {
    pub fn count(max_retries: usize) -> Self {
        ExhaustionPolicy::Count(CountPolicy::default().with_max_retries(max_retries))
    }

    pub fn deadline(timeout: Duration, poll_interval: Duration) -> Self {
        ExhaustionPolicy::Deadline(DeadlinePolicy::new(timeout, poll_interval))
    }

    pub fn validate(&self) -> Result<(), ExecutorError> {
        match self {
            ExhaustionPolicy::Count(_) => Ok(()),
            ExhaustionPolicy::Deadline(policy) => {
                if policy.poll_interval.is_zero() {
                    return Err(ExecutorError::InvalidConfiguration(
                        "poll interval must be strictly positive".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExhaustionPolicy::Count(_) => "count",
            ExhaustionPolicy::Deadline(_) => "deadline",
        }
    }
}

impl From<CountPolicy> for ExhaustionPolicy {
    fn from(policy: CountPolicy) -> Self {
        ExhaustionPolicy::Count(policy)
    }
}

impl From<DeadlinePolicy> for ExhaustionPolicy {
    fn from(policy: DeadlinePolicy) -> Self {
        ExhaustionPolicy::Deadline(policy)
    }
}

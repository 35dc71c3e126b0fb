use log::{debug, error, info, warn};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::state::{AttemptRecord, AttemptStatus, ExecutorState};
use crate::error::{ExecutorError, Failure, OperationError, Outcome};
use crate::operation::Operation;
use crate::policy::ExhaustionPolicy;
use crate::time::{Clock, SystemClock, Timer, TokioTimer};

/// Runs an operation until it succeeds or its policy gives up.
///
/// An executor holds no per-run state, so one instance can serve any number
/// of concurrent runs.
pub struct Executor<T: Sync, V: Send> {
    operation: Arc<dyn Operation<T, V>>,
    policy: ExhaustionPolicy,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
}

impl<T: Sync, V: Send> Clone for Executor<T, V> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
            policy: self.policy.clone(),
            clock: self.clock.clone(),
            timer: self.timer.clone(),
        }
    }
}

pub struct ExecutorBuilder<T: Sync, V: Send> {
    operation: Option<Arc<dyn Operation<T, V>>>,
    policy: Option<ExhaustionPolicy>,
    clock: Option<Arc<dyn Clock>>,
    timer: Option<Arc<dyn Timer>>,
}

impl<T: Sync, V: Send> Default for ExecutorBuilder<T, V> {
    fn default() -> Self {
        Self {
            operation: None,
            policy: None,
            clock: None,
            timer: None,
        }
    }
}

impl<T: Sync, V: Send> ExecutorBuilder<T, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation<O: Operation<T, V> + 'static>(mut self, operation: O) -> Self {
        self.operation = Some(Arc::new(operation));
        self
    }

    pub fn with_shared_operation(mut self, operation: Arc<dyn Operation<T, V>>) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_policy(mut self, policy: impl Into<ExhaustionPolicy>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_timer<W: Timer + 'static>(mut self, timer: W) -> Self {
        self.timer = Some(Arc::new(timer));
        self
    }

    pub fn build(self) -> Result<Executor<T, V>, ExecutorError> {
        let operation = self.operation.ok_or_else(|| {
            ExecutorError::InvalidConfiguration("an operation is required".into())
        })?;
        let policy = self.policy.ok_or_else(|| {
            ExecutorError::InvalidConfiguration("an exhaustion policy is required".into())
        })?;
        policy.validate()?;

        Ok(Executor {
            operation,
            policy,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
            timer: self.timer.unwrap_or_else(|| Arc::new(TokioTimer)),
        })
    }
}

/// Per-run budget derived from the policy.
enum Budget {
    Count {
        max_attempts: usize,
        delay: Duration,
    },
    Deadline {
        start: Duration,
        deadline: Duration,
        poll_interval: Duration,
        // The start reading doubles as the first boundary check.
        pending: Option<Duration>,
    },
}

impl Budget {
    fn start(policy: &ExhaustionPolicy, clock: &dyn Clock) -> Self {
        match policy {
            ExhaustionPolicy::Count(count) => Budget::Count {
                max_attempts: count.max_attempts(),
                delay: count.retry_delay,
            },
            ExhaustionPolicy::Deadline(deadline) => {
                let start = clock.now();
                Budget::Deadline {
                    start,
                    deadline: deadline.deadline_from(start),
                    poll_interval: deadline.poll_interval,
                    pending: Some(start),
                }
            }
        }
    }

    /// Decides at an attempt boundary whether another attempt may start,
    /// returning the clock reading that admitted it.
    fn admit(&mut self, attempts: usize, clock: &dyn Clock) -> Option<Duration> {
        match self {
            Budget::Count { max_attempts, .. } => {
                if attempts < *max_attempts {
                    Some(clock.now())
                } else {
                    None
                }
            }
            Budget::Deadline { deadline, pending, .. } => {
                let now = pending.take().unwrap_or_else(|| clock.now());
                if now <= *deadline {
                    Some(now)
                } else {
                    None
                }
            }
        }
    }

    /// Whether a failed attempt is followed by a wait. A deadline budget is
    /// only re-evaluated after the wait.
    fn allows_retry(&self, attempts: usize) -> bool {
        match self {
            Budget::Count { max_attempts, .. } => attempts < *max_attempts,
            Budget::Deadline { .. } => true,
        }
    }

    fn delay(&self) -> Duration {
        match self {
            Budget::Count { delay, .. } => *delay,
            Budget::Deadline { poll_interval, .. } => *poll_interval,
        }
    }

    fn exhausted(
        &self,
        target: String,
        attempts: usize,
        last_error: Option<OperationError>,
    ) -> Failure {
        match self {
            Budget::Count { .. } => Failure::ExhaustedByCount {
                target,
                attempts,
                last_error,
            },
            Budget::Deadline { start, deadline, .. } => Failure::ExhaustedByDeadline {
                target,
                attempts,
                timeout: deadline.saturating_sub(*start),
                last_error,
            },
        }
    }
}

/// Bookkeeping for a single run.
struct Run {
    target: String,
    state: ExecutorState,
    attempts: usize,
    last: Option<AttemptRecord>,
}

impl Run {
    fn new(target: String) -> Self {
        Self {
            target,
            state: ExecutorState::Idle,
            attempts: 0,
            last: None,
        }
    }

    fn enter(&mut self, next: ExecutorState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("Run on {}: {} -> {}", self.target, self.state, next);
        self.state = next;
    }

    fn record(&mut self, status: AttemptStatus, started_at: Duration) {
        self.last = Some(AttemptRecord {
            index: self.attempts,
            status,
            started_at,
        });
    }

    fn fail(&mut self, failure: Failure) -> Failure {
        self.enter(ExecutorState::Resolved);
        if let Some(last) = &self.last {
            debug!(
                "Run on {}: last attempt {} was a {} at {:?}",
                self.target, last.index, last.status, last.started_at
            );
        }
        error!("Run on {} failed ({}): {}", self.target, failure.reason(), failure);
        failure
    }

    fn cancelled(&mut self) -> Failure {
        let failure = Failure::Cancelled {
            target: self.target.clone(),
            attempts: self.attempts,
        };
        self.fail(failure)
    }
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.map_or(false, CancellationToken::is_cancelled)
}

impl<T: Sync + Debug, V: Send> Executor<T, V> {
    pub fn builder() -> ExecutorBuilder<T, V> {
        ExecutorBuilder::new()
    }

    pub fn policy(&self) -> &ExhaustionPolicy {
        &self.policy
    }

    /// Drives the operation against `target` until it resolves.
    pub async fn run(&self, target: &T) -> Outcome<V> {
        self.drive(target, None).await
    }

    /// Like [`run`](Self::run), but stops at the next attempt boundary or
    /// wait once `cancel` fires. An attempt already in flight is allowed to
    /// finish.
    pub async fn run_with_cancel(&self, target: &T, cancel: &CancellationToken) -> Outcome<V> {
        self.drive(target, Some(cancel)).await
    }

    async fn drive(&self, target: &T, cancel: Option<&CancellationToken>) -> Outcome<V> {
        let mut run = Run::new(format!("{:?}", target));
        let mut last_error: Option<OperationError> = None;
        let mut budget = Budget::start(&self.policy, self.clock.as_ref());

        info!(
            "Run on {} starting under {} policy",
            run.target,
            self.policy.kind()
        );

        loop {
            if is_cancelled(cancel) {
                return Err(run.cancelled());
            }

            let started_at = match budget.admit(run.attempts, self.clock.as_ref()) {
                Some(now) => now,
                None => {
                    let failure = budget.exhausted(run.target.clone(), run.attempts, last_error);
                    return Err(run.fail(failure));
                }
            };

            run.enter(ExecutorState::Attempting);
            run.attempts += 1;
            debug!(
                "Run on {}: attempt {} at {:?}",
                run.target, run.attempts, started_at
            );

            match self.operation.invoke(target).await {
                Ok(value) => {
                    run.record(AttemptStatus::Succeeded, started_at);
                    run.enter(ExecutorState::Resolved);
                    info!(
                        "Run on {} succeeded on attempt {}",
                        run.target, run.attempts
                    );
                    return Ok(value);
                }
                Err(e) if e.is_fatal() => {
                    run.record(AttemptStatus::FatalFailure, started_at);
                    let failure = Failure::Fatal {
                        target: run.target.clone(),
                        attempt: run.attempts,
                        source: e,
                    };
                    return Err(run.fail(failure));
                }
                Err(e) => {
                    run.record(AttemptStatus::TransientFailure, started_at);
                    warn!(
                        "Run on {} failed on attempt {}: {}",
                        run.target, run.attempts, e
                    );
                    last_error = Some(e);
                }
            }

            if !budget.allows_retry(run.attempts) {
                let failure = budget.exhausted(run.target.clone(), run.attempts, last_error);
                return Err(run.fail(failure));
            }

            if is_cancelled(cancel) {
                return Err(run.cancelled());
            }

            run.enter(ExecutorState::Waiting);
            let delay = budget.delay();
            if !delay.is_zero() {
                debug!("Run on {}: waiting {:?}", run.target, delay);
                if !self.wait(delay, cancel).await {
                    return Err(run.cancelled());
                }
            }
        }
    }

    /// Returns `false` if the wait was cut short by cancellation.
    async fn wait(&self, delay: Duration, cancel: Option<&CancellationToken>) -> bool {
        match cancel {
            Some(token) => tokio::select! {
                _ = self.timer.sleep(delay) => true,
                _ = token.cancelled() => false,
            },
            None => {
                self.timer.sleep(delay).await;
                true
            }
        }
    }
}

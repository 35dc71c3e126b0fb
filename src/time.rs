//! Time capabilities injected into the executor.
//!
//! The executor never samples the system clock directly. It reads time from a
//! [`Clock`] and waits through a [`Timer`], so tests can substitute
//! [`ManualClock`] and [`ManualTimer`] and simulate any amount of elapsed time
//! without waiting for it.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Monotonic time source, measured from an origin chosen by the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Suspends the current run for a given duration.
#[async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio runtime's monotonic clock.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Timer that suspends on `tokio::time::sleep`.
#[derive(Debug, Clone, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

struct ClockState {
    current: Duration,
    script: VecDeque<Duration>,
    reads: usize,
}

/// Clock under test control.
///
/// Scripted readings are returned in order, one per call to `now()`; once the
/// script runs out the last reading repeats until the clock is advanced.
#[derive(Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualClock {
    pub fn new(start: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                current: start,
                script: VecDeque::new(),
                reads: 0,
            })),
        }
    }

    /// A clock whose successive `now()` calls return `readings`.
    pub fn scripted(readings: impl IntoIterator<Item = Duration>) -> Self {
        let clock = Self::new(Duration::ZERO);
        clock.lock().script.extend(readings);
        clock
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.current = state.current.saturating_add(by);
    }

    pub fn set(&self, to: Duration) {
        self.lock().current = to;
    }

    /// Number of times `now()` has been called.
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let mut state = self.lock();
        state.reads += 1;
        if let Some(next) = state.script.pop_front() {
            state.current = next;
        }
        state.current
    }
}

/// Timer that returns immediately, recording each requested wait and
/// advancing an attached [`ManualClock`] by the same amount.
#[derive(Clone, Default)]
pub struct ManualTimer {
    clock: Option<ManualClock>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driving(clock: ManualClock) -> Self {
        Self {
            clock: Some(clock),
            sleeps: Arc::default(),
        }
    }

    /// Every wait requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Timer for ManualTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
        // Give other tasks (e.g. a canceller) a chance to run.
        tokio::task::yield_now().await;
    }
}

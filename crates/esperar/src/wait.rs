//! Bounded-time and bounded-count retry primitives.
//!
//! Every higher-level find/assert operation is built on three policies:
//! poll until a predicate holds ([`until_true`]), retry until an operation
//! stops failing ([`until_ok`] / [`until_done`]), and retry a fixed number
//! of times ([`retrying`]). The time-bounded loops share one invariant:
//! elapsed time is checked *after* a failed attempt, never before the first
//! one, so every operation gets at least one attempt even with a zero
//! budget.
//!
//! The three policies are not interchangeable. Count-bounded retry is for
//! idempotent one-shot operations where failure is rare and an immediate
//! retry is safe; time-bounded retry is for operations racing an
//! asynchronous UI state change.

use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};

use crate::result::{EsperarError, EsperarResult};

/// Default budget for element-weight lookups (10 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Budget for window-weight appearance waits (20 seconds)
pub const APPEARANCE_TIMEOUT: Duration = Duration::from_secs(20);

/// Fixed pacing between failed attempts of the value-returning retry
pub const RETRY_PACING: Duration = Duration::from_millis(50);

/// Default attempt count for [`retrying`]
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// What a polling loop does between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollStrategy {
    /// Re-attempt immediately; the attempt itself is the expensive,
    /// blocking step (a remote tree query), so there is nothing to pace
    Busy,
    /// Yield the thread between attempts
    YieldBetweenAttempts,
}

/// Per-call retry budget: a wall-clock timeout plus a poll strategy.
///
/// Not persisted anywhere; supplied at each call site, defaulting to the
/// 10-second element-weight budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Total wall-clock budget
    pub timeout: Duration,
    /// Pacing between attempts
    pub strategy: PollStrategy,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            strategy: PollStrategy::Busy,
        }
    }
}

impl Budget {
    /// Budget with the given timeout and busy polling
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            strategy: PollStrategy::Busy,
        }
    }

    /// The 20-second window-appearance budget
    #[must_use]
    pub const fn appearance() -> Self {
        Self::new(APPEARANCE_TIMEOUT)
    }

    /// Override the poll strategy
    #[must_use]
    pub const fn with_strategy(mut self, strategy: PollStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    fn pause(&self) {
        match self.strategy {
            PollStrategy::Busy => {}
            PollStrategy::YieldBetweenAttempts => thread::yield_now(),
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Poll `predicate` until it returns true or the budget runs out.
///
/// No sleep between attempts beyond the budget's strategy: predicate
/// evaluation is usually the blocking step. The predicate is evaluated at
/// least once even with a zero timeout.
///
/// # Errors
///
/// `ConditionTimeout` naming `description`, the configured budget, and the
/// elapsed time.
pub fn until_true<F>(mut predicate: F, budget: Budget, description: &str) -> EsperarResult<()>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    loop {
        if predicate() {
            return Ok(());
        }
        if start.elapsed() > budget.timeout {
            return Err(EsperarError::ConditionTimeout {
                description: description.to_string(),
                timeout_ms: budget.timeout_ms(),
                elapsed_ms: elapsed_ms(start),
            });
        }
        budget.pause();
    }
}

/// Retry a value-returning operation until it succeeds or the budget runs
/// out, pacing failed attempts by [`RETRY_PACING`] to avoid hammering a
/// provider mid-failure.
///
/// This is the paced poll; [`until_done`] is the tight one. Non-retryable
/// errors (`Unsupported`) pass through on the spot without consuming the
/// budget.
///
/// # Errors
///
/// `RetryTimeout` carrying the attempt count, elapsed time, and the last
/// underlying failure's message.
pub fn until_ok<T, F>(mut operation: F, budget: Budget) -> EsperarResult<T>
where
    F: FnMut() -> EsperarResult<T>,
{
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => {
                if start.elapsed() > budget.timeout {
                    return Err(EsperarError::RetryTimeout {
                        timeout_ms: budget.timeout_ms(),
                        elapsed_ms: elapsed_ms(start),
                        attempts,
                        cause: err.to_string(),
                    });
                }
                thread::sleep(RETRY_PACING);
            }
        }
    }
}

/// Retry an action until it succeeds or the budget runs out, yielding the
/// thread before each attempt and sleeping never.
///
/// # Errors
///
/// `RetryTimeout`, as for [`until_ok`].
pub fn until_done<F>(mut operation: F, budget: Budget) -> EsperarResult<()>
where
    F: FnMut() -> EsperarResult<()>,
{
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        thread::yield_now();
        attempts += 1;
        match operation() {
            Ok(()) => return Ok(()),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => {
                if start.elapsed() > budget.timeout {
                    return Err(EsperarError::RetryTimeout {
                        timeout_ms: budget.timeout_ms(),
                        elapsed_ms: elapsed_ms(start),
                        attempts,
                        cause: err.to_string(),
                    });
                }
            }
        }
    }
}

/// Retry a fixed number of times with no timing component at all.
///
/// The final attempt's error is returned unmodified. `attempts` is clamped
/// to at least one.
///
/// # Errors
///
/// Whatever the last attempt returned.
pub fn retrying<T, F>(mut operation: F, attempts: u32) -> EsperarResult<T>
where
    F: FnMut() -> EsperarResult<T>,
{
    let attempts = attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => return Err(err),
            Err(_) => {}
        }
    }
}

//! Deadline-bounded condition polling
//!
//! ```text
//! Idle -> Polling -> { Satisfied, TimedOut, ObservationFailed, Cancelled }
//!           ^    |
//!           +----+  condition absent and budget left: sleep(interval)
//! ```
//!
//! The predicate is always evaluated before sleeping, so a zero timeout still
//! gets exactly one probe. A probe error ends the run immediately.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::PollError;
use crate::policy::PollPolicy;

/// Terminal state of a poll run
#[derive(Debug)]
pub enum PollOutcome<T, E> {
    /// The predicate produced a value
    Satisfied {
        value: T,
        elapsed: Duration,
        attempts: u32,
    },

    /// The budget ran out before the condition held
    TimedOut {
        elapsed: Duration,
        attempts: u32,
        timeout: Duration,
    },

    /// The predicate itself failed while observing the resource
    ObservationFailed {
        error: E,
        elapsed: Duration,
        attempts: u32,
    },

    /// The caller's cancellation token fired
    Cancelled { elapsed: Duration, attempts: u32 },
}

impl<T, E> PollOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Satisfied { attempts, .. }
            | PollOutcome::TimedOut { attempts, .. }
            | PollOutcome::ObservationFailed { attempts, .. }
            | PollOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollOutcome::Satisfied { elapsed, .. }
            | PollOutcome::TimedOut { elapsed, .. }
            | PollOutcome::ObservationFailed { elapsed, .. }
            | PollOutcome::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied { .. })
    }

    /// Keep the value, turn every other outcome into a [`PollError`]
    pub fn into_result(self) -> Result<T, PollError<E>> {
        match self {
            PollOutcome::Satisfied { value, .. } => Ok(value),
            PollOutcome::TimedOut {
                elapsed,
                attempts,
                timeout,
            } => Err(PollError::TimedOut {
                attempts,
                elapsed,
                timeout,
            }),
            PollOutcome::ObservationFailed {
                error,
                elapsed,
                attempts,
            } => Err(PollError::ObservationFailed {
                source: error,
                attempts,
                elapsed,
            }),
            PollOutcome::Cancelled { elapsed, attempts } => {
                Err(PollError::Cancelled { attempts, elapsed })
            }
        }
    }
}

/// Probe `predicate` every `policy.interval()` until it yields a value, fails,
/// or the next probe would start after `policy.timeout()`.
///
/// Blocked time never exceeds `timeout + interval`. A `TimedOut` elapsed can
/// be below `timeout` when `interval` does not divide it: the last probe is
/// the last one that fits inside the budget.
///
/// # Example
///
/// ```ignore
/// let outcome = poll_until(
///     || session.find(Locator::Id("registration-form")),
///     PollPolicy::from_millis(500, 2000)?,
/// )
/// .await;
/// ```
pub async fn poll_until<T, E, F, Fut>(predicate: F, policy: PollPolicy) -> PollOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    run(predicate, &policy, None).await
}

/// Like [`poll_until`], but gives up with [`PollOutcome::Cancelled`] once
/// `cancel` fires. The token is checked before each probe and before each
/// sleep; a sleep already in progress is not interrupted.
pub async fn poll_until_cancellable<T, E, F, Fut>(
    predicate: F,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> PollOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    run(predicate, &policy, Some(cancel)).await
}

async fn run<T, E, F, Fut>(
    mut predicate: F,
    policy: &PollPolicy,
    cancel: Option<&CancellationToken>,
) -> PollOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let clock = policy.clock();
    let interval = policy.interval();
    let timeout = policy.timeout();
    let start = clock.now();
    let mut attempts: u32 = 0;

    let cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);

    loop {
        if cancelled() {
            let elapsed = clock.now().saturating_duration_since(start);
            debug!(attempts, ?elapsed, "poll cancelled");
            return PollOutcome::Cancelled { elapsed, attempts };
        }

        attempts = attempts.saturating_add(1);
        let observation = predicate().await;
        let elapsed = clock.now().saturating_duration_since(start);

        match observation {
            Ok(Some(value)) => {
                trace!(attempts, ?elapsed, "condition satisfied");
                return PollOutcome::Satisfied {
                    value,
                    elapsed,
                    attempts,
                };
            }
            Err(error) => {
                debug!(attempts, ?elapsed, "observation failed");
                return PollOutcome::ObservationFailed {
                    error,
                    elapsed,
                    attempts,
                };
            }
            Ok(None) => {}
        }

        if elapsed.saturating_add(interval) > timeout {
            debug!(attempts, ?elapsed, ?timeout, "poll timed out");
            return PollOutcome::TimedOut {
                elapsed,
                attempts,
                timeout,
            };
        }

        if cancelled() {
            debug!(attempts, ?elapsed, "poll cancelled");
            return PollOutcome::Cancelled { elapsed, attempts };
        }

        trace!(attempts, ?elapsed, "condition not met, sleeping {:?}", interval);
        clock.sleep(interval).await;
    }
}

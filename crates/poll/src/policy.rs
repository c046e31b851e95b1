//! Poll policy: how often to probe and for how long

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::error::PolicyError;

/// Default time between probes
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Default total wait budget
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Interval, timeout and clock for a single poll run
///
/// Cheap to clone; clones share the clock.
#[derive(Clone)]
pub struct PollPolicy {
    interval: Duration,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl PollPolicy {
    /// Create a policy on the system clock. `interval` must be non-zero.
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, PolicyError> {
        if interval.is_zero() {
            return Err(PolicyError::ZeroInterval);
        }

        Ok(Self {
            interval,
            timeout,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Result<Self, PolicyError> {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
    }

    /// Replace the clock, e.g. with a [`ManualClock`](crate::ManualClock) in tests
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Same interval and clock, different budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for PollPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollPolicy")
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

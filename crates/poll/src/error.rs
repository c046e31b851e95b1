//! Error types for polling

use std::time::Duration;
use thiserror::Error;

/// Rejected poll policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

/// A poll that ended without the condition being satisfied
#[derive(Error, Debug)]
pub enum PollError<E> {
    #[error("condition not met after {attempts} attempt(s) in {elapsed:?} (timeout {timeout:?})")]
    TimedOut {
        attempts: u32,
        elapsed: Duration,
        timeout: Duration,
    },

    #[error("observation failed on attempt {attempts} after {elapsed:?}: {source}")]
    ObservationFailed {
        #[source]
        source: E,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("poll cancelled after {attempts} attempt(s) in {elapsed:?}")]
    Cancelled { attempts: u32, elapsed: Duration },
}

impl<E> PollError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollError::TimedOut { attempts, .. }
            | PollError::ObservationFailed { attempts, .. }
            | PollError::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollError::TimedOut { elapsed, .. }
            | PollError::ObservationFailed { elapsed, .. }
            | PollError::Cancelled { elapsed, .. } => *elapsed,
        }
    }
}

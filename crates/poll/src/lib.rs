//! GreenLight condition polling
//!
//! Replaces fixed sleeps and hand-rolled retry counters in UI tests with a
//! single deadline-bounded primitive:
//!
//! - [`poll_until`] probes a caller-supplied predicate until it yields a value,
//!   fails, or the budget in [`PollPolicy`] runs out
//! - [`Clock`] abstracts time and sleeping so tests run without real delays
//! - [`PollOutcome`] reports the terminal state with attempts and elapsed time

pub mod clock;
pub mod error;
pub mod policy;
pub mod poller;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PolicyError, PollError};
pub use policy::{PollPolicy, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
pub use poller::{poll_until, poll_until_cancellable, PollOutcome};

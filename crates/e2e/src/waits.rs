//! Poll-backed waits on a browser session
//!
//! These replace fixed sleeps after interactions: the page is re-read every
//! `policy.interval()` until the expected state shows up or the budget runs
//! out. Session errors end the wait immediately.

use greenlight_poll::{poll_until, PollError, PollOutcome, PollPolicy};
use tracing::warn;

use crate::error::{E2eError, E2eResult};
use crate::session::{BrowserSession, Locator};

/// Wait until `locator` matches an element and return it
pub async fn wait_for_element<S>(
    session: &S,
    locator: Locator<'_>,
    policy: PollPolicy,
) -> E2eResult<S::Element>
where
    S: BrowserSession,
{
    let outcome = poll_until(|| session.find(locator), policy).await;
    finish(outcome, || format!("element {}", locator))
}

/// Wait until attribute `name` of `element` satisfies `accept`; returns the
/// accepted value
pub async fn wait_for_attribute<S, P>(
    session: &S,
    element: &S::Element,
    name: &str,
    accept: P,
    policy: PollPolicy,
) -> E2eResult<String>
where
    S: BrowserSession,
    P: Fn(&str) -> bool,
{
    let accept = &accept;
    let outcome = poll_until(
        move || async move {
            let value = session.attribute(element, name).await?;
            Ok::<_, E2eError>(value.filter(|v| accept(v.as_str())))
        },
        policy,
    )
    .await;
    finish(outcome, || format!("attribute {}", name))
}

/// Wait until attribute `name` contains `needle`
pub async fn wait_for_attribute_contains<S>(
    session: &S,
    element: &S::Element,
    name: &str,
    needle: &str,
    policy: PollPolicy,
) -> E2eResult<String>
where
    S: BrowserSession,
{
    wait_for_attribute(session, element, name, |value| value.contains(needle), policy)
        .await
        .map_err(|e| match e {
            E2eError::WaitTimeout {
                attempts,
                elapsed,
                timeout,
                ..
            } => E2eError::WaitTimeout {
                what: format!("attribute {} to contain {:?}", name, needle),
                attempts,
                elapsed,
                timeout,
            },
            other => other,
        })
}

fn finish<T, F>(outcome: PollOutcome<T, E2eError>, what: F) -> E2eResult<T>
where
    F: FnOnce() -> String,
{
    match outcome.into_result() {
        Ok(value) => Ok(value),
        Err(PollError::ObservationFailed { source, .. }) => Err(source),
        Err(PollError::TimedOut {
            attempts,
            elapsed,
            timeout,
        }) => {
            let what = what();
            warn!("Gave up waiting for {} after {} attempt(s)", what, attempts);
            Err(E2eError::WaitTimeout {
                what,
                attempts,
                elapsed,
                timeout,
            })
        }
        Err(PollError::Cancelled { .. }) => Err(E2eError::Cancelled(what())),
    }
}

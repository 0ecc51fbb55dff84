//! Step display gating.
//!
//! A step carrying `waitUntil` is announced only once its delay has elapsed
//! and its selector matches in the host page. The delay runs first, then the
//! selector is polled on a fixed interval.

use std::time::Duration;

use scenetour_core::error::TourError;
use scenetour_core::probe::SelectorProbe;
use scenetour_scene::domain::step::WaitUntil;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::debug;

use crate::domain::validator::selector_ready;

/// Shortest poll interval used; smaller values are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How readiness conditions are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessOptions {
    /// Time between two selector probes. Values below
    /// [`MIN_POLL_INTERVAL`] are raised to it.
    pub poll_interval: Duration,
    /// Upper bound on the whole wait. `None` waits until cancelled.
    pub timeout: Option<Duration>,
}

impl Default for ReadinessOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: None,
        }
    }
}

/// Waits until every condition in `conditions` holds, in order.
///
/// # Errors
///
/// Returns `TourError::ReadinessTimeout` when `options.timeout` elapses
/// first. It names the selector still missing, or none if the timeout fired
/// during a delay.
pub async fn wait_until_ready(
    conditions: &[WaitUntil],
    probe: &dyn SelectorProbe,
    options: ReadinessOptions,
) -> Result<(), TourError> {
    let poll = options.poll_interval.max(MIN_POLL_INTERVAL);
    let Some(limit) = options.timeout else {
        wait_all(conditions, probe, poll).await;
        return Ok(());
    };

    tokio::time::timeout(limit, wait_all(conditions, probe, poll))
        .await
        .map_err(|_| TourError::ReadinessTimeout {
            selector: first_missing(conditions, probe),
        })
}

async fn wait_all(conditions: &[WaitUntil], probe: &dyn SelectorProbe, poll: Duration) {
    for wait in conditions {
        if let Some(delay) = wait.delay.filter(|ms| *ms > 0) {
            debug!(delay_ms = delay, "delaying step");
            sleep(Duration::from_millis(delay)).await;
        }

        if selector_ready(wait, probe) {
            continue;
        }
        debug!(selector = wait.selector.as_deref(), "waiting for selector");
        let mut ticker = interval(poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if selector_ready(wait, probe) {
                break;
            }
        }
    }
}

fn first_missing(conditions: &[WaitUntil], probe: &dyn SelectorProbe) -> Option<String> {
    conditions
        .iter()
        .find(|wait| !selector_ready(wait, probe))
        .and_then(|wait| wait.selector.clone())
}

//! Bounded retry for rate-limited submissions.
//!
//! Only `RateLimited` outcomes are retried; any other outcome is terminal
//! on the attempt that produced it. Waits grow linearly with the retry
//! number, and a nonzero server hint replaces the scheduled wait.

use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::queue::Recipient;
use crate::traits::{DispatchEvent, EventSink, Submitter, TransferOutcome};

/// Retry budget and wait schedule for rate-limited sends.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; total submissions are capped at
    /// `max_retries + 1`
    pub max_retries: u32,
    /// Wait before the first retry
    pub base_wait: Duration,
    /// Added to the wait for each further retry
    pub wait_increment: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_wait: Duration::from_secs(5),
            wait_increment: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Wait before retry number `retry` (1-based). A nonzero server hint
    /// wins over the linear schedule.
    pub fn wait_for(&self, retry: u32, hint: Duration) -> Duration {
        if !hint.is_zero() {
            return hint;
        }
        self.base_wait + self.wait_increment * retry.saturating_sub(1)
    }
}

/// Drives one task to a terminal outcome, retrying rate-limited attempts
/// within the policy budget.
///
/// The returned outcome is never `RateLimited`; an exhausted budget maps
/// to a failure. Returns `None` when the run is cancelled during a
/// backoff wait, in which case the task has no terminal outcome and the
/// caller stops at this boundary.
pub async fn submit_with_retry(
    policy: &RetryPolicy,
    submitter: &dyn Submitter,
    recipient: &Recipient,
    amount: f64,
    token: &CancellationToken,
    sink: &dyn EventSink,
) -> Option<(TransferOutcome, u32)> {
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let outcome = submitter.submit(recipient, amount).await;

        let retry_after = match outcome {
            TransferOutcome::RateLimited { retry_after, .. } => retry_after,
            outcome => return Some((outcome, attempts)),
        };

        if attempts > policy.max_retries {
            debug!(
                "{} still rate limited after {} attempts, giving up",
                recipient, attempts
            );
            return Some((TransferOutcome::failure("rate limit exceeded"), attempts));
        }

        let wait = policy.wait_for(attempts, retry_after);
        debug!(
            "{} rate limited (attempt {}/{}), waiting {:?}",
            recipient,
            attempts,
            policy.max_retries + 1,
            wait
        );

        countdown(wait, recipient, attempts, token, sink).await?;
    }
}

/// Waits out a backoff period one second at a time, emitting a countdown
/// event per tick. Returns `None` if cancelled mid-wait.
async fn countdown(
    wait: Duration,
    recipient: &Recipient,
    attempt: u32,
    token: &CancellationToken,
    sink: &dyn EventSink,
) -> Option<()> {
    let mut remaining = wait;

    while !remaining.is_zero() {
        sink.emit(DispatchEvent::RetryWait {
            recipient: recipient.clone(),
            attempt,
            remaining_secs: remaining.as_secs(),
        });

        let step = remaining.min(Duration::from_secs(1));
        tokio::select! {
            _ = token.cancelled() => return None,
            _ = sleep(step) => {}
        }

        remaining -= step;
    }

    Some(())
}

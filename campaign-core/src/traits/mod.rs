use async_trait::async_trait;
use std::time::Duration;

use crate::error::SessionError;
use crate::queue::{Recipient, SendTask};
use crate::stats::RunSummary;

/// Result of a single transfer attempt.
///
/// `RateLimited` is only ever produced by submitters; the retry layer
/// consumes it and hands terminal outcomes to the dispatch loop.
#[derive(Debug, Clone)]
pub enum TransferOutcome {
    /// The backend accepted the transfer
    Success { hash: String, amount: f64 },
    /// The transfer was rejected or lost; never retried
    Failure { reason: String },
    /// The backend asked us to back off. A zero `retry_after` means the
    /// server gave no hint.
    RateLimited { retry_after: Duration, attempts: u32 },
}

impl TransferOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A transfer backend. One network attempt per `submit` call, bounded in
/// time, no internal retry.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Returns the backend name used in logs
    fn name(&self) -> &str;

    /// Performs a single transfer attempt
    async fn submit(&self, recipient: &Recipient, amount: f64) -> TransferOutcome;

    /// Acquires the backing session before the first submission
    async fn open(&self) -> Result<(), SessionError> {
        Ok(())
    }

    /// Releases the backing session
    async fn close(&self) {}
}

/// Produces signatures over canonical transfer payloads
pub trait Signer: Send + Sync {
    /// Returns the sending wallet address derived from the key
    fn address(&self) -> &str;

    /// Signs the payload bytes
    fn sign(&self, message: &[u8]) -> Vec<u8>;
}

/// Progress notifications emitted while a campaign runs.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    RoundStarted {
        round: u64,
        tasks: usize,
    },
    /// Jitter pause before the next task
    Sleeping {
        secs: f64,
    },
    /// One tick of a rate-limit countdown
    RetryWait {
        recipient: Recipient,
        attempt: u32,
        remaining_secs: u64,
    },
    TaskFinished {
        task: SendTask,
        index: usize,
        total: usize,
        attempts: u32,
        outcome: TransferOutcome,
    },
    RoundFinished {
        round: u64,
        summary: RunSummary,
    },
    /// Fixed pause between rounds in continuous mode
    RoundPause {
        secs: f64,
    },
}

/// Receives dispatch progress events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DispatchEvent);
}

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: DispatchEvent) {}
}

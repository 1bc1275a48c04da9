use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::queue::{Recipient, SendTask};
use crate::traits::TransferOutcome;

/// Per-recipient tally of dispatched sends.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WalletTally {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Immutable end-of-run report, serializable for export.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub success_rate: f64,
    pub total_amount: f64,
    pub elapsed_secs: f64,
    pub throughput_per_sec: f64,
    pub per_wallet: BTreeMap<String, WalletTally>,
}

impl RunSummary {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Mutable statistics accumulator owned by one dispatch invocation.
///
/// Only dispatched tasks are recorded; recipients that never came up
/// (cancelled run) do not appear in the per-wallet map.
#[derive(Debug)]
pub struct RunStatistics {
    total: u64,
    succeeded: u64,
    failed: u64,
    total_amount: f64,
    started_at: Instant,
    per_wallet: HashMap<Recipient, WalletTally>,
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStatistics {
    pub fn new() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            total_amount: 0.0,
            started_at: Instant::now(),
            per_wallet: HashMap::new(),
        }
    }

    /// Records the terminal outcome of one dispatched task.
    pub fn record(&mut self, task: &SendTask, outcome: &TransferOutcome) {
        self.total += 1;
        let tally = self.per_wallet.entry(task.recipient.clone()).or_default();
        tally.dispatched += 1;

        match outcome {
            TransferOutcome::Success { amount, .. } => {
                self.succeeded += 1;
                tally.succeeded += 1;
                self.total_amount += amount;
            }
            _ => {
                self.failed += 1;
                tally.failed += 1;
            }
        }
    }

    /// Clears all counters and restarts the elapsed clock.
    pub fn reset(&mut self) {
        self.total = 0;
        self.succeeded = 0;
        self.failed = 0;
        self.total_amount = 0.0;
        self.started_at = Instant::now();
        self.per_wallet.clear();
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn summarize(&self) -> RunSummary {
        let elapsed_secs = self.started_at.elapsed().as_secs_f64();

        RunSummary {
            generated_at: Utc::now().to_rfc3339(),
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            success_rate: if self.total > 0 {
                self.succeeded as f64 / self.total as f64 * 100.0
            } else {
                0.0
            },
            total_amount: self.total_amount,
            elapsed_secs,
            throughput_per_sec: if elapsed_secs > 0.0 {
                self.total as f64 / elapsed_secs
            } else {
                0.0
            },
            per_wallet: self
                .per_wallet
                .iter()
                .map(|(recipient, tally)| (recipient.as_str().to_string(), *tally))
                .collect(),
        }
    }
}

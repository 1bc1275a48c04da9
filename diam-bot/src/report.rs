//! Console and file reporting for campaign progress.
//!
//! `LogSink` turns dispatch events into `send_result` / `countdown`
//! log lines; the logger's console formatter colorizes the keywords.

use campaign_core::{DispatchEvent, DispatchReport, EventSink, TransferOutcome};
use colored::Colorize;
use tracing::{info, warn};

/// Event sink that narrates the campaign through tracing.
///
/// Per-send results go to `send_result` (console and file); jitter and
/// rate-limit countdowns go to `countdown` (console only).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: DispatchEvent) {
        match event {
            DispatchEvent::RoundStarted { round, tasks } => {
                info!(
                    target: "send_result",
                    "--- Round {} | {} transfers queued ---",
                    round, tasks
                );
            }
            DispatchEvent::Sleeping { secs } => {
                info!(target: "countdown", "Waiting {:.1}s before next transfer", secs);
            }
            DispatchEvent::RetryWait {
                recipient,
                attempt,
                remaining_secs,
            } => {
                info!(
                    target: "countdown",
                    "Rate limited on attempt {} for {} | retrying in {}s",
                    attempt, recipient, remaining_secs
                );
            }
            DispatchEvent::TaskFinished {
                task,
                index,
                total,
                attempts,
                outcome,
            } => {
                let note = attempt_note(attempts);
                match outcome {
                    TransferOutcome::Success { hash, amount } => {
                        info!(
                            target: "send_result",
                            "[{}/{}] Sent {:.4} DIAM to {} | {}{}",
                            index, total, amount, task.recipient, hash, note
                        );
                    }
                    TransferOutcome::Failure { reason } => {
                        warn!(
                            target: "send_result",
                            "[{}/{}] Failed for {} | {}{}",
                            index, total, task.recipient, reason, note
                        );
                    }
                    // The retry layer never hands RateLimited to the loop
                    TransferOutcome::RateLimited { .. } => {
                        warn!(
                            target: "send_result",
                            "[{}/{}] Failed for {} | rate limited{}",
                            index, total, task.recipient, note
                        );
                    }
                }
            }
            DispatchEvent::RoundFinished { round, summary } => {
                info!(
                    target: "send_result",
                    "--- Round {} done | {} ok, {} failed, {:.4} DIAM ---",
                    round, summary.succeeded, summary.failed, summary.total_amount
                );
            }
            DispatchEvent::RoundPause { secs } => {
                info!(target: "countdown", "Round pause: {:.0}s", secs);
            }
        }
    }
}

fn attempt_note(attempts: u32) -> String {
    if attempts > 1 {
        format!(" (attempt {})", attempts)
    } else {
        String::new()
    }
}

/// Logs the end-of-run totals to console and file.
pub fn print_summary(report: &DispatchReport) {
    let summary = &report.summary;

    info!(target: "send_result", "{}", "=== Campaign Summary ===".bold());
    if report.cancelled {
        info!(
            target: "send_result",
            "{}",
            "Interrupted; totals cover dispatched transfers only".yellow()
        );
    }
    info!(
        target: "send_result",
        "Rounds: {} | Transfers: {} | Success: {} | Failed: {} | Success Rate: {:.2}%",
        report.rounds, summary.total, summary.succeeded, summary.failed, summary.success_rate
    );
    info!(
        target: "send_result",
        "Total DIAM: {:.4} | Elapsed: {:.1}s | Throughput: {:.2} tx/s",
        summary.total_amount, summary.elapsed_secs, summary.throughput_per_sec
    );
    for (wallet, tally) in &summary.per_wallet {
        info!(
            target: "send_result",
            "  {} -> {} sent, {} ok, {} failed",
            wallet, tally.dispatched, tally.succeeded, tally.failed
        );
    }
}

/// Writes the JSON summary to `path`.
pub async fn export_summary(report: &DispatchReport, path: &str) -> std::io::Result<()> {
    tokio::fs::write(path, report.summary.to_json()).await
}

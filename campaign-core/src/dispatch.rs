//! Sequential campaign dispatch.
//!
//! One task at a time: jitter wait, submit through the retry layer,
//! record the outcome, continue. Cancellation is honored at task
//! boundaries and during waits, never mid-submission.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{CampaignConfig, StatsScope};
use crate::error::{CampaignError, ConfigError};
use crate::queue::{build_queue, SendTask};
use crate::retry::{submit_with_retry, RetryPolicy};
use crate::stats::{RunStatistics, RunSummary};
use crate::traits::{DispatchEvent, EventSink, Submitter, TransferOutcome};

/// Everything a finished (or cancelled) dispatch produced.
#[derive(Debug)]
pub struct DispatchReport {
    /// Terminal outcome of every dispatched task, in dispatch order
    pub results: Vec<(SendTask, TransferOutcome)>,
    /// Cumulative statistics, scoped per `StatsScope`
    pub summary: RunSummary,
    /// Rounds that started
    pub rounds: u64,
    /// Whether the run ended on cancellation
    pub cancelled: bool,
}

impl DispatchReport {
    /// Process exit code: 130 when interrupted, 1 when any dispatched
    /// task failed, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.cancelled {
            130
        } else if self.results.iter().any(|(_, outcome)| !outcome.is_success()) {
            1
        } else {
            0
        }
    }
}

/// Sequential dispatch engine. Holds the submitter, retry policy and
/// event sink for the duration of a run.
pub struct Dispatcher {
    submitter: Arc<dyn Submitter>,
    policy: RetryPolicy,
    sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    pub fn new(
        submitter: Arc<dyn Submitter>,
        policy: RetryPolicy,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            submitter,
            policy,
            sink,
        }
    }

    /// Runs the campaign to completion or cancellation.
    ///
    /// Fatal configuration problems surface before anything is sent.
    /// Once dispatch begins this always returns `Ok`: per-task failures
    /// are recorded and the loop continues, and cancellation yields the
    /// partial report.
    pub async fn run(
        &self,
        config: &CampaignConfig,
        token: CancellationToken,
    ) -> Result<DispatchReport, ConfigError> {
        config.validate()?;

        let mut results = Vec::new();
        let mut cumulative = RunStatistics::new();
        let mut rounds = 0u64;
        let mut cancelled = false;

        'rounds: loop {
            rounds += 1;
            if config.stats_scope == StatsScope::ResetEachRound && rounds > 1 {
                cumulative.reset();
            }
            let mut round_stats = RunStatistics::new();

            let queue = build_queue(&config.recipients, config.sends_per_wallet)?;
            let total = queue.len();
            self.sink.emit(DispatchEvent::RoundStarted {
                round: rounds,
                tasks: total,
            });
            info!(
                "Round {} started: {} tasks via {}",
                rounds,
                total,
                self.submitter.name()
            );

            for (index, task) in queue.into_iter().enumerate() {
                if token.is_cancelled() {
                    cancelled = true;
                    break 'rounds;
                }

                if index > 0 {
                    let jitter = config.delay.random();
                    self.sink.emit(DispatchEvent::Sleeping {
                        secs: jitter.as_secs_f64(),
                    });
                    tokio::select! {
                        _ = token.cancelled() => {
                            cancelled = true;
                            break 'rounds;
                        }
                        _ = sleep(jitter) => {}
                    }
                }

                let amount = config.amount.draw();
                debug!(
                    "Dispatching {:.4} DIAM to {} (send {}/{})",
                    amount, task.recipient, task.seq_in_wallet, config.sends_per_wallet
                );

                let submitted = submit_with_retry(
                    &self.policy,
                    self.submitter.as_ref(),
                    &task.recipient,
                    amount,
                    &token,
                    self.sink.as_ref(),
                )
                .await;
                let Some((outcome, attempts)) = submitted else {
                    cancelled = true;
                    break 'rounds;
                };

                cumulative.record(&task, &outcome);
                round_stats.record(&task, &outcome);
                self.sink.emit(DispatchEvent::TaskFinished {
                    task: task.clone(),
                    index: index + 1,
                    total,
                    attempts,
                    outcome: outcome.clone(),
                });
                results.push((task, outcome));
            }

            self.sink.emit(DispatchEvent::RoundFinished {
                round: rounds,
                summary: round_stats.summarize(),
            });

            if !more_rounds(config, rounds) {
                break;
            }

            self.sink.emit(DispatchEvent::RoundPause {
                secs: config.round_pause_secs,
            });
            tokio::select! {
                _ = token.cancelled() => {
                    cancelled = true;
                    break;
                }
                _ = sleep(Duration::from_secs_f64(config.round_pause_secs)) => {}
            }
        }

        if cancelled {
            info!("Dispatch interrupted; reporting partial results");
        }

        Ok(DispatchReport {
            results,
            summary: cumulative.summarize(),
            rounds,
            cancelled,
        })
    }
}

fn more_rounds(config: &CampaignConfig, completed: u64) -> bool {
    if !config.continuous {
        return false;
    }
    match config.max_rounds {
        Some(max) => completed < max,
        None => true,
    }
}

/// Full campaign bracket: validate, open the submitter session, dispatch,
/// and release the session on every exit path after a successful open.
pub async fn run_campaign(
    submitter: Arc<dyn Submitter>,
    config: &CampaignConfig,
    policy: RetryPolicy,
    sink: Arc<dyn EventSink>,
    token: CancellationToken,
) -> Result<DispatchReport, CampaignError> {
    config.validate()?;

    submitter.open().await?;

    let dispatcher = Dispatcher::new(Arc::clone(&submitter), policy, sink);
    let outcome = dispatcher.run(config, token).await;
    submitter.close().await;

    Ok(outcome?)
}

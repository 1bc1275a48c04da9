//! # Campaign Core - DIAM Transfer Dispatch Engine
//!
//! Shared engine for DIAM transfer campaigns: builds randomized send
//! queues, paces submissions with jittered delays, retries rate-limited
//! sends within a bounded budget and aggregates per-run statistics.
//! Transfer backends plug in through the [`Submitter`] trait, so the
//! engine never touches HTTP or key material itself.
//!
//! ## Modules
//!
//! - [`config`] - Campaign configuration and validation
//! - [`dispatch`] - Sequential dispatch loop and the campaign bracket
//! - [`error`] - Typed error handling with thiserror
//! - [`queue`] - Recipient queue construction
//! - [`retry`] - Bounded retry for rate-limited sends
//! - [`stats`] - Run statistics and summaries
//! - [`traits`] - Core trait definitions

pub mod config;
pub mod dispatch;
pub mod error;
pub mod queue;
pub mod retry;
pub mod stats;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{AmountSpec, CampaignConfig, DelayRange, StatsScope};
pub use dispatch::{run_campaign, DispatchReport, Dispatcher};
pub use error::{CampaignError, ConfigError, SessionError};
pub use queue::{build_queue, Recipient, SendTask};
pub use retry::{submit_with_retry, RetryPolicy};
pub use stats::{RunStatistics, RunSummary, WalletTally};
pub use traits::{DispatchEvent, EventSink, NullSink, Signer, Submitter, TransferOutcome};

// Utils are pub(crate) - only the logger setup is public
pub use utils::setup_logger;

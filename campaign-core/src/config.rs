//! Engine-level campaign configuration.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;
use crate::queue::Recipient;

/// Transfer amount: fixed, or drawn uniformly per send.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountSpec {
    Fixed(f64),
    Range { min: f64, max: f64 },
}

impl Default for AmountSpec {
    fn default() -> Self {
        AmountSpec::Fixed(1.0)
    }
}

impl AmountSpec {
    /// Draws the amount for one send
    pub fn draw(&self) -> f64 {
        match *self {
            AmountSpec::Fixed(value) => value,
            AmountSpec::Range { min, max } => rand::thread_rng().gen_range(min..=max),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            AmountSpec::Fixed(value) if value.is_finite() && value > 0.0 => Ok(()),
            AmountSpec::Fixed(value) => Err(ConfigError::InvalidAmount {
                reason: format!("must be positive and finite, got {value}"),
            }),
            AmountSpec::Range { min, max }
                if min.is_finite() && max.is_finite() && min > 0.0 && min <= max =>
            {
                Ok(())
            }
            AmountSpec::Range { min, max } => Err(ConfigError::InvalidAmount {
                reason: format!("range {min}..{max} must be positive, finite and ordered"),
            }),
        }
    }
}

/// Uniform jitter window between consecutive sends, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Draws one jitter delay
    pub fn random(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs_f64(secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // NaN compares false everywhere, so check finiteness explicitly
        if !self.min_secs.is_finite()
            || !self.max_secs.is_finite()
            || self.min_secs < 0.0
            || self.min_secs > self.max_secs
        {
            return Err(ConfigError::InvalidDelayRange {
                min_secs: self.min_secs,
                max_secs: self.max_secs,
            });
        }
        Ok(())
    }
}

/// Whether cumulative statistics survive round boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsScope {
    /// Keep accumulating across rounds; per-round numbers are still
    /// reported at each round boundary
    #[default]
    Accumulate,
    /// Clear the cumulative counters at the start of every round, so the
    /// final report covers the last round only
    ResetEachRound,
}

/// Settings for one campaign invocation.
///
/// The dispatcher takes an owned snapshot; edits to the source
/// configuration after a run starts do not affect it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Destination wallets
    pub recipients: Vec<Recipient>,
    /// Sends per recipient per round
    #[serde(default = "default_sends_per_wallet")]
    pub sends_per_wallet: u32,
    /// DIAM amount per send
    #[serde(default)]
    pub amount: AmountSpec,
    /// Jitter window between consecutive sends
    pub delay: DelayRange,
    /// Keep dispatching rounds until cancelled or `max_rounds` is reached
    #[serde(default)]
    pub continuous: bool,
    /// Upper bound on rounds in continuous mode; `None` means unbounded
    #[serde(default)]
    pub max_rounds: Option<u64>,
    /// Fixed pause between rounds, in seconds
    #[serde(default = "default_round_pause_secs")]
    pub round_pause_secs: f64,
    /// Statistics behavior at round boundaries
    #[serde(default)]
    pub stats_scope: StatsScope,
}

fn default_sends_per_wallet() -> u32 {
    2
}

fn default_round_pause_secs() -> f64 {
    30.0
}

impl CampaignConfig {
    /// Checks every fatal precondition. The dispatcher calls this before
    /// anything is sent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recipients.is_empty() {
            return Err(ConfigError::EmptyRecipients);
        }
        if let Some(index) = self.recipients.iter().position(|r| r.is_blank()) {
            return Err(ConfigError::BlankRecipient { index });
        }
        if self.sends_per_wallet == 0 {
            return Err(ConfigError::InvalidSendsPerWallet { value: 0 });
        }
        self.amount.validate()?;
        self.delay.validate()?;
        if !self.round_pause_secs.is_finite() || self.round_pause_secs < 0.0 {
            return Err(ConfigError::InvalidRoundPause {
                secs: self.round_pause_secs,
            });
        }
        if self.continuous && self.max_rounds == Some(0) {
            return Err(ConfigError::InvalidMaxRounds);
        }
        Ok(())
    }

    /// Number of tasks in one round
    pub fn tasks_per_round(&self) -> usize {
        self.recipients.len() * self.sends_per_wallet as usize
    }
}

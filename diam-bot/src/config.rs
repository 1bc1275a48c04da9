use anyhow::{Context, Result};
use campaign_core::{AmountSpec, CampaignConfig, DelayRange, Recipient, RetryPolicy, StatsScope};
use config::{Config, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Which transfer backend drives the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Direct backend API calls with a captured session token
    Api,
    /// Locally signed transfer requests
    Wallet,
}

impl Mode {
    /// Pacing defaults when the config sets no delay window. Wallet-mode
    /// sends pace like a person driving the UI; API mode runs much
    /// tighter.
    pub fn default_delay(self) -> DelayRange {
        match self {
            Mode::Api => DelayRange::new(1.5, 4.0),
            Mode::Wallet => DelayRange::new(90.0, 150.0),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Api => write!(f, "api"),
            Mode::Wallet => write!(f, "wallet"),
        }
    }
}

/// On-disk bot configuration (`campaign.toml`).
///
/// Credentials never live here; they come from the environment or an
/// interactive prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Backend base URL, e.g. `https://testnet.diamante.example`
    pub api_url: String,
    /// Transfer backend; prompted interactively when absent
    pub mode: Option<Mode>,
    /// Inline recipient addresses
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Extra recipients file: one address per line, `#` comments allowed
    pub recipients_file: Option<String>,
    #[serde(default = "default_sends_per_wallet")]
    pub sends_per_wallet: u32,
    /// Fixed DIAM amount per send; exclusive with amount_min/amount_max
    pub amount: Option<f64>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    /// Jitter window override in seconds; a single bound fixes the delay
    pub delay_min_secs: Option<f64>,
    pub delay_max_secs: Option<f64>,
    #[serde(default)]
    pub continuous: bool,
    pub max_rounds: Option<u64>,
    #[serde(default = "default_round_pause_secs")]
    pub round_pause_secs: f64,
    #[serde(default)]
    pub stats_scope: StatsScope,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_sends_per_wallet() -> u32 {
    2
}

fn default_round_pause_secs() -> f64 {
    30.0
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

impl BotConfig {
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    /// Collects inline and file recipients. Entries are trimmed;
    /// comments and blank lines are skipped, duplicates skipped with a
    /// warning.
    pub fn load_recipients(&self) -> Result<Vec<Recipient>> {
        let mut seen = HashSet::new();
        let mut recipients = Vec::new();

        let mut push = |raw: &str, origin: &str| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return;
            }
            if !seen.insert(trimmed.to_string()) {
                warn!("Skipping duplicate recipient {} ({})", trimmed, origin);
                return;
            }
            recipients.push(Recipient::new(trimmed));
        };

        for raw in &self.recipients {
            push(raw.as_str(), "config");
        }

        if let Some(ref path) = self.recipients_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read recipients file {}", path))?;
            for line in content.lines() {
                push(line, path.as_str());
            }
        }

        Ok(recipients)
    }

    /// Produces the engine configuration for the chosen mode.
    pub fn resolve(&self, mode: Mode) -> Result<CampaignConfig> {
        let recipients = self.load_recipients()?;

        let delay = match (self.delay_min_secs, self.delay_max_secs) {
            (Some(min), Some(max)) => DelayRange::new(min, max),
            (Some(fixed), None) | (None, Some(fixed)) => DelayRange::new(fixed, fixed),
            (None, None) => mode.default_delay(),
        };

        Ok(CampaignConfig {
            recipients,
            sends_per_wallet: self.sends_per_wallet,
            amount: self.amount_spec()?,
            delay,
            continuous: self.continuous,
            max_rounds: self.max_rounds,
            round_pause_secs: self.round_pause_secs,
            stats_scope: self.stats_scope,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn amount_spec(&self) -> Result<AmountSpec> {
        match (self.amount, self.amount_min, self.amount_max) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                anyhow::bail!("Set either amount or amount_min/amount_max, not both")
            }
            (Some(fixed), None, None) => Ok(AmountSpec::Fixed(fixed)),
            (None, Some(min), Some(max)) => Ok(AmountSpec::Range { min, max }),
            (None, Some(_), None) | (None, None, Some(_)) => {
                anyhow::bail!("amount_min and amount_max must be set together")
            }
            (None, None, None) => Ok(AmountSpec::default()),
        }
    }
}

//! # Campaign Error Types
//!
//! Centralized error definitions for the campaign-core crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for campaign operations.
///
/// Wraps the fatal error categories so the application layer can
/// propagate them through a single interface. Per-transfer failures are
/// not errors; they are reported as outcomes and the run continues.
#[derive(Error, Debug)]
pub enum CampaignError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Session(SessionError),
}

impl From<ConfigError> for CampaignError {
    fn from(e: ConfigError) -> Self {
        CampaignError::Config(e)
    }
}

impl From<SessionError> for CampaignError {
    fn from(e: SessionError) -> Self {
        CampaignError::Session(e)
    }
}

/// Configuration validation errors.
///
/// All of these are fatal and are reported before any transfer is
/// dispatched.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Recipient list is empty")]
    EmptyRecipients,

    #[error("Recipient at index {index} is blank")]
    BlankRecipient { index: usize },

    #[error("sends_per_wallet must be at least 1, got {value}")]
    InvalidSendsPerWallet { value: u32 },

    #[error("Invalid transfer amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid delay range {min_secs}s..{max_secs}s")]
    InvalidDelayRange { min_secs: f64, max_secs: f64 },

    #[error("Invalid round pause {secs}s")]
    InvalidRoundPause { secs: f64 },

    #[error("max_rounds must be at least 1 when set")]
    InvalidMaxRounds,

    #[error("Missing credential: {what}")]
    MissingCredential { what: String },
}

/// Session acquisition and signing-key errors
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("Session rejected by {endpoint} (HTTP {status})")]
    Unauthorized { endpoint: String, status: u16 },

    #[error("Session handshake with {endpoint} failed: {reason}")]
    Handshake { endpoint: String, reason: String },

    #[error("Invalid signing key: {reason}")]
    InvalidKey { reason: String },

    #[error("Transport error: {reason}")]
    Transport { reason: String },
}

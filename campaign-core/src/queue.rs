//! Recipient queue construction.
//!
//! Expands the configured recipient list into a flat, shuffled list of
//! send tasks for one round of dispatch.

use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// A destination wallet address, stored with surrounding whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Recipient(String);

impl Recipient {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Recipient {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

impl From<&str> for Recipient {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<Recipient> for String {
    fn from(recipient: Recipient) -> Self {
        recipient.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One planned transfer: which recipient, and which of its repeats this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTask {
    pub recipient: Recipient,
    /// 1-based position among this recipient's sends within the round
    pub seq_in_wallet: u32,
}

/// Expands the recipient list into a shuffled task queue.
///
/// Every recipient appears exactly `sends_per_wallet` times with distinct
/// `seq_in_wallet` values. The order is a fresh uniform permutation on
/// every call; back-to-back tasks for the same recipient are possible.
pub fn build_queue(
    recipients: &[Recipient],
    sends_per_wallet: u32,
) -> Result<Vec<SendTask>, ConfigError> {
    if recipients.is_empty() {
        return Err(ConfigError::EmptyRecipients);
    }
    if sends_per_wallet == 0 {
        return Err(ConfigError::InvalidSendsPerWallet { value: 0 });
    }
    for (index, recipient) in recipients.iter().enumerate() {
        if recipient.is_blank() {
            return Err(ConfigError::BlankRecipient { index });
        }
    }

    let mut queue = Vec::with_capacity(recipients.len() * sends_per_wallet as usize);
    for recipient in recipients {
        for seq in 1..=sends_per_wallet {
            queue.push(SendTask {
                recipient: recipient.clone(),
                seq_in_wallet: seq,
            });
        }
    }
    queue.shuffle(&mut thread_rng());

    Ok(queue)
}

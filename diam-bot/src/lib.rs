//! DIAM Campaign Bot
//!
//! Host crate for the campaign-core dispatch engine: loads the TOML
//! configuration, resolves credentials, wires one of the two transfer
//! backends (direct API or locally signed wallet requests) and renders
//! progress and the final summary in the terminal.

pub mod config;
pub mod menu;
pub mod report;
pub mod signer;
pub mod submitter;

pub use config::{BotConfig, Mode};
pub use signer::Ed25519Signer;
pub use submitter::{ApiSubmitter, WalletSubmitter};

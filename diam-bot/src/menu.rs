//! Interactive prompts for mode, credentials and launch confirmation.

use anyhow::{Context, Result};
use campaign_core::{CampaignConfig, ConfigError};
use dialoguer::{theme::ColorfulTheme, Confirm, Password, Select};
use std::env;
use std::io::{stdin, IsTerminal};
use tracing::info;
use zeroize::Zeroizing;

use crate::config::Mode;

/// Asks which backend to drive when neither flag nor config chose one.
pub fn choose_mode() -> Result<Mode> {
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Transfer mode")
        .item("API (captured session token)")
        .item("Wallet (local signing key)")
        .default(0)
        .interact()
        .context("Cannot prompt for mode (not a terminal); set mode in the config or pass --mode")?;

    Ok(match selection {
        0 => Mode::Api,
        _ => Mode::Wallet,
    })
}

/// Masked credential prompt used when the environment variable is unset.
pub fn prompt_secret(prompt: &str) -> Result<Zeroizing<String>> {
    let input = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .report(true)
        .interact()
        .context("Cannot prompt for credentials (not a terminal); set the environment variable")?;

    Ok(Zeroizing::new(input))
}

/// Resolves a credential: environment variable first, masked prompt as
/// the interactive fallback.
pub fn credential(var: &str, prompt: &str) -> Result<Zeroizing<String>> {
    resolve_credential(var, prompt, stdin().is_terminal())
}

fn resolve_credential(var: &str, prompt: &str, attended: bool) -> Result<Zeroizing<String>> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(Zeroizing::new(value.trim().to_owned())),
        _ if attended => {
            info!(target: "send_result", "{} is not set; prompting", var);
            prompt_secret(prompt)
        }
        _ => Err(ConfigError::MissingCredential {
            what: var.to_owned(),
        })
        .with_context(|| format!("Set {} in the environment or run from a terminal", var)),
    }
}

/// Shows the resolved campaign and asks for the go-ahead.
pub fn confirm_launch(mode: Mode, campaign: &CampaignConfig) -> Result<bool> {
    println!("\nCampaign plan:");
    println!("   Mode:        {}", mode);
    println!("   Recipients:  {}", campaign.recipients.len());
    println!("   Sends each:  {}", campaign.sends_per_wallet);
    println!("   Per round:   {} transfers", campaign.tasks_per_round());
    println!(
        "   Delay:       {:.1}s - {:.1}s",
        campaign.delay.min_secs, campaign.delay.max_secs
    );
    if campaign.continuous {
        match campaign.max_rounds {
            Some(n) => println!("   Rounds:      up to {}", n),
            None => println!("   Rounds:      until stopped"),
        }
    }
    println!();

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Start the campaign?")
        .default(true)
        .interact()
        .context("Cannot confirm launch (not a terminal); pass --yes to skip")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_prefers_environment() {
        env::set_var("DIAM_TEST_CRED_SET", "  tok-123  ");
        let secret = resolve_credential("DIAM_TEST_CRED_SET", "unused", false).unwrap();
        assert_eq!(secret.as_str(), "tok-123");
        env::remove_var("DIAM_TEST_CRED_SET");
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        env::remove_var("DIAM_TEST_CRED_UNSET");
        let err = resolve_credential("DIAM_TEST_CRED_UNSET", "unused", false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        env::set_var("DIAM_TEST_CRED_BLANK", "   ");
        let err = resolve_credential("DIAM_TEST_CRED_BLANK", "unused", false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingCredential { .. })
        ));
        env::remove_var("DIAM_TEST_CRED_BLANK");
    }
}

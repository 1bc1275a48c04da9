//! Wallet-mode submitter: signs the canonical transfer payload locally
//! and posts the signed request, so no captured session is needed.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use campaign_core::{Recipient, SessionError, Signer, Submitter, TransferOutcome};
use reqwest::Client;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{dispatch_request, http_client, join, parse_base};

pub struct WalletSubmitter {
    client: Client,
    account_url: Url,
    transfer_url: Url,
    signer: Arc<dyn Signer>,
}

impl WalletSubmitter {
    pub fn new(
        api_url: &str,
        signer: Arc<dyn Signer>,
        timeout: Duration,
    ) -> Result<Self, SessionError> {
        let base = parse_base(api_url)?;
        let account_url = join(&base, &format!("api/v1/accounts/{}", signer.address()))?;
        let transfer_url = join(&base, "api/v1/wallet/transfer")?;
        let client = http_client(timeout)?;

        Ok(Self {
            client,
            account_url,
            transfer_url,
            signer,
        })
    }

    /// Canonical payload covered by the signature. The amount is pinned
    /// to seven decimal places so both sides sign identical bytes.
    fn payload(&self, recipient: &Recipient, amount: f64, timestamp: i64) -> String {
        format!(
            "{}|{}|{:.7}|{}",
            self.signer.address(),
            recipient,
            amount,
            timestamp
        )
    }
}

#[async_trait]
impl Submitter for WalletSubmitter {
    fn name(&self) -> &str {
        "wallet"
    }

    async fn submit(&self, recipient: &Recipient, amount: f64) -> TransferOutcome {
        let timestamp = chrono::Utc::now().timestamp();
        let payload = self.payload(recipient, amount, timestamp);
        let signature = BASE64.encode(self.signer.sign(payload.as_bytes()));

        let request = self.client.post(self.transfer_url.clone()).json(&json!({
            "from": self.signer.address(),
            "to": recipient.as_str(),
            "amount": amount,
            "timestamp": timestamp,
            "signature": signature,
        }));

        dispatch_request(request, amount).await
    }

    async fn open(&self) -> Result<(), SessionError> {
        debug!("Checking account {}", self.signer.address());

        let response = self
            .client
            .get(self.account_url.clone())
            .send()
            .await
            .map_err(|e| SessionError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(SessionError::Unauthorized {
                endpoint: self.account_url.to_string(),
                status,
            });
        }
        if status == 404 {
            return Err(SessionError::Handshake {
                endpoint: self.account_url.to_string(),
                reason: format!("account {} not found", self.signer.address()),
            });
        }
        if !(200..300).contains(&status) {
            return Err(SessionError::Handshake {
                endpoint: self.account_url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for WalletSubmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSubmitter")
            .field("transfer_url", &self.transfer_url.as_str())
            .field("from", &self.signer.address())
            .finish()
    }
}

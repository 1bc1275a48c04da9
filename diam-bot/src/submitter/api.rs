//! Direct backend submitter driven by a captured session token.

use async_trait::async_trait;
use campaign_core::{Recipient, SessionError, Submitter, TransferOutcome};
use reqwest::Client;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use super::{dispatch_request, http_client, join, parse_base};

/// Posts transfers straight to the backend transfer endpoint with a
/// bearer session token captured from an authenticated browser session.
pub struct ApiSubmitter {
    client: Client,
    session_url: Url,
    transfer_url: Url,
    token: Zeroizing<String>,
}

impl ApiSubmitter {
    pub fn new(
        api_url: &str,
        token: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, SessionError> {
        let base = parse_base(api_url)?;
        let session_url = join(&base, "api/v1/session")?;
        let transfer_url = join(&base, "api/v1/transfer")?;
        let client = http_client(timeout)?;

        Ok(Self {
            client,
            session_url,
            transfer_url,
            token,
        })
    }
}

#[async_trait]
impl Submitter for ApiSubmitter {
    fn name(&self) -> &str {
        "api"
    }

    async fn submit(&self, recipient: &Recipient, amount: f64) -> TransferOutcome {
        let request = self
            .client
            .post(self.transfer_url.clone())
            .bearer_auth(self.token.as_str())
            .json(&json!({
                "to": recipient.as_str(),
                "amount": amount,
                "asset": "DIAM",
            }));

        dispatch_request(request, amount).await
    }

    async fn open(&self) -> Result<(), SessionError> {
        debug!("Validating session against {}", self.session_url);

        let response = self
            .client
            .get(self.session_url.clone())
            .bearer_auth(self.token.as_str())
            .send()
            .await
            .map_err(|e| SessionError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(SessionError::Unauthorized {
                endpoint: self.session_url.to_string(),
                status,
            });
        }
        if !(200..300).contains(&status) {
            return Err(SessionError::Handshake {
                endpoint: self.session_url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        Ok(())
    }

    async fn close(&self) {
        debug!("API session released");
    }
}

impl fmt::Debug for ApiSubmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSubmitter")
            .field("transfer_url", &self.transfer_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

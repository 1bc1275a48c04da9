//! Transfer backends.
//!
//! Both backends normalize HTTP responses through [`outcome_from_response`],
//! so the dispatch engine sees a single outcome contract regardless of
//! mode.

mod api;
mod wallet;

pub use api::ApiSubmitter;
pub use wallet::WalletSubmitter;

use campaign_core::{SessionError, TransferOutcome};
use std::time::Duration;
use url::Url;

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, SessionError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SessionError::Transport {
            reason: e.to_string(),
        })
}

/// Normalizes the configured base URL so endpoint joins keep its path.
pub(crate) fn parse_base(api_url: &str) -> Result<Url, SessionError> {
    let mut normalized = api_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|e| SessionError::Handshake {
        endpoint: api_url.to_string(),
        reason: format!("invalid base URL: {}", e),
    })
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url, SessionError> {
    base.join(path).map_err(|e| SessionError::Handshake {
        endpoint: base.to_string(),
        reason: format!("invalid endpoint path: {}", e),
    })
}

/// Sends one prepared request and folds status, headers and body into a
/// transfer outcome. Transport timeouts become plain failures.
pub(crate) async fn dispatch_request(
    request: reqwest::RequestBuilder,
    amount: f64,
) -> TransferOutcome {
    match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            outcome_from_response(status, retry_after, &body, amount)
        }
        Err(e) if e.is_timeout() => TransferOutcome::failure("timeout"),
        Err(e) => TransferOutcome::failure(format!("transport error: {}", e)),
    }
}

/// Maps one HTTP response to a transfer outcome.
///
/// 2xx needs a transaction hash in the body to count as success; 429
/// becomes `RateLimited` with the server hint when one was sent (header
/// first, then body), zero otherwise.
pub(crate) fn outcome_from_response(
    status: u16,
    retry_after_header: Option<u64>,
    body: &str,
    amount: f64,
) -> TransferOutcome {
    let json = serde_json::from_str::<serde_json::Value>(body).ok();

    if (200..300).contains(&status) {
        let hash = json.as_ref().and_then(|v| {
            ["hash", "txHash", "tx_hash"]
                .iter()
                .find_map(|k| v.get(k).and_then(|h| h.as_str()).map(str::to_string))
        });
        return match hash {
            Some(hash) => TransferOutcome::Success { hash, amount },
            None => TransferOutcome::failure("missing transaction hash in response"),
        };
    }

    if status == 429 {
        let hint = retry_after_header.or_else(|| {
            json.as_ref().and_then(|v| {
                ["retryAfter", "retry_after"]
                    .iter()
                    .find_map(|k| v.get(k).and_then(|h| h.as_u64()))
            })
        });
        return TransferOutcome::RateLimited {
            retry_after: Duration::from_secs(hint.unwrap_or(0)),
            attempts: 1,
        };
    }

    let reason = json
        .as_ref()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("HTTP {}", status));

    TransferOutcome::Failure { reason }
}

use std::time::Duration;

use anyhow::{Context, Result};

/// Builds the shared HTTP client used by the engine and directory adapters.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Fails on non-success statuses, carrying the response body for diagnosis.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    url: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Request to {} returned {}: {}", url, status, body);
    }
    Ok(response)
}

use anyhow::{Context, Result};

use crate::config::HttpConfig;

/// Builds the client shared by every provider. Both timeouts are always set
/// so a stalled vendor cannot hold a request forever.
pub fn build_http_client(http: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(http.connect_timeout())
        .timeout(http.request_timeout())
        .build()
        .context("Failed to build HTTP client")
}

/// Reads a failed response into an error carrying status and body.
pub async fn error_from_response(vendor: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    anyhow::anyhow!("{} API error ({}): {}", vendor, status, error_text)
}

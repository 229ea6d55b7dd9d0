use reqwest::{Client, ClientBuilder};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use crate::error::{AppError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Shared client so every board reuses the same connection pool
static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// Installs the shared client. Only the first call has an effect.
pub fn init_client(timeout: Duration) -> Result<()> {
    let client = build_client(timeout)?;
    let _ = CLIENT.set(client);
    Ok(())
}

pub fn client() -> &'static Client {
    CLIENT.get_or_init(|| build_client(DEFAULT_TIMEOUT).expect("Failed to build HTTP client"))
}

/// GETs a webhook and decodes its body as JSON.
pub async fn fetch_json(url: &str) -> Result<Value> {
    let response = client().get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::FetchError(format!("HTTP error: {}", status)));
    }

    let body = response.text().await?;
    debug!(url, bytes = body.len(), "webhook responded");

    serde_json::from_str(&body)
        .map_err(|e| AppError::ShapeError(format!("response body is not valid JSON: {}", e)))
}

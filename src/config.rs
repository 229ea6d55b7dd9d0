use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_INVOICE_WEBHOOK_URL: &str =
    "https://n8n.srv749429.hstgr.cloud/webhook/782018a4-1ccd-4799-b171-6a6989674ecf";
pub const DEFAULT_TRAVEL_WEBHOOK_URL: &str =
    "https://n8n.srv749429.hstgr.cloud/webhook/0481451b-7ba4-43aa-aa9b-3a4edad8a14a";
pub const DEFAULT_UPLOAD_FORM_URL: &str =
    "https://n8n.srv749429.hstgr.cloud/form/699eadc1-53e9-4708-8b14-7852832195eb";
pub const DEFAULT_TRAVEL_SITE_BASE_URL: &str = "https://www.cercledesvoyages.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub invoice_webhook_url: String,
    pub travel_webhook_url: String,
    pub fetch_timeout: Duration,
    /// Prefix for voyage cover images and permalinks, which arrive as site-relative paths.
    pub travel_site_base_url: String,
    pub upload_form_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = get("HOST", "127.0.0.1");
        let port = get("PORT", "3000");
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let timeout_secs = get("FETCH_TIMEOUT_SECS", "10");
        let timeout_secs = timeout_secs
            .parse::<u64>()
            .map_err(|e| AppError::ConfigError(format!("Invalid fetch timeout: {}", e)))?;
        if timeout_secs == 0 {
            return Err(AppError::ConfigError("Fetch timeout must be at least one second".to_string()));
        }

        let invoice_webhook_url = require_http_url("INVOICE_WEBHOOK_URL", get("INVOICE_WEBHOOK_URL", DEFAULT_INVOICE_WEBHOOK_URL))?;
        let travel_webhook_url = require_http_url("TRAVEL_WEBHOOK_URL", get("TRAVEL_WEBHOOK_URL", DEFAULT_TRAVEL_WEBHOOK_URL))?;

        let travel_site_base_url = get("TRAVEL_SITE_BASE_URL", DEFAULT_TRAVEL_SITE_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            invoice_webhook_url,
            travel_webhook_url,
            fetch_timeout: Duration::from_secs(timeout_secs),
            travel_site_base_url,
            upload_form_url: get("UPLOAD_FORM_URL", DEFAULT_UPLOAD_FORM_URL),
        })
    }
}

fn require_http_url(key: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(AppError::ConfigError(format!("{} must be an http(s) URL, got {:?}", key, value)))
    }
}

use std::time::Duration;

use hookrelay_engine::EngineConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum delivery attempts per webhook delivery (default: `3`).
    pub webhook_max_retries: i32,
    /// Base retry backoff in milliseconds (default: `5000`).
    pub webhook_base_delay_ms: u64,
    /// Outbound delivery attempt timeout in seconds (default: `30`).
    pub webhook_timeout_secs: u64,
    /// Name of the outbound signature header
    /// (default: `X-Webhook-Signature`).
    pub webhook_signature_header: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `WEBHOOK_MAX_RETRIES`      | `3`                     |
    /// | `WEBHOOK_BASE_DELAY_MS`    | `5000`                  |
    /// | `WEBHOOK_TIMEOUT_SECS`     | `30`                    |
    /// | `WEBHOOK_SIGNATURE_HEADER` | `X-Webhook-Signature`   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let webhook_max_retries: i32 = std::env::var("WEBHOOK_MAX_RETRIES")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("WEBHOOK_MAX_RETRIES must be a valid i32");

        let webhook_base_delay_ms: u64 = std::env::var("WEBHOOK_BASE_DELAY_MS")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("WEBHOOK_BASE_DELAY_MS must be a valid u64");

        let webhook_timeout_secs: u64 = std::env::var("WEBHOOK_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("WEBHOOK_TIMEOUT_SECS must be a valid u64");

        let webhook_signature_header = std::env::var("WEBHOOK_SIGNATURE_HEADER")
            .unwrap_or_else(|_| "X-Webhook-Signature".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            webhook_max_retries,
            webhook_base_delay_ms,
            webhook_timeout_secs,
            webhook_signature_header,
        }
    }

    /// Engine configuration derived from the server configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_retries: self.webhook_max_retries,
            base_delay: Duration::from_millis(self.webhook_base_delay_ms),
            request_timeout: Duration::from_secs(self.webhook_timeout_secs),
            signature_header: self.webhook_signature_header.clone(),
            ..EngineConfig::default()
        }
    }
}

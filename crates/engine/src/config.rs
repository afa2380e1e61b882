use std::time::Duration;

use crate::executor::DEFAULT_SIGNATURE_HEADER;

/// Tunable parameters of the delivery engine.
///
/// The defaults match production behaviour; tests shrink the delays.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum HTTP attempts per delivery (default: `3`).
    pub max_retries: i32,
    /// Base retry delay; doubles per failed attempt (default: `5s`).
    pub base_delay: Duration,
    /// Timeout for a single delivery attempt (default: `30s`).
    pub request_timeout: Duration,
    /// Name of the signature header (default: `X-Webhook-Signature`).
    pub signature_header: String,
    /// Maximum stored length of a subscriber response body, in
    /// characters (default: `1000`).
    pub response_body_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(5000),
            request_timeout: Duration::from_secs(30),
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
            response_body_cap: 1000,
        }
    }
}

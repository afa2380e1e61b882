//! Single-attempt HTTP delivery execution.

use std::sync::Arc;

use hookrelay_core::types::EntityId;
use hookrelay_core::{signature, EventType};
use reqwest::header::CONTENT_TYPE;

use crate::config::EngineConfig;

/// Default name of the signature header.
pub const DEFAULT_SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// Header carrying the event-type wire name.
pub const EVENT_HEADER: &str = "X-Webhook-Event";

/// Header carrying the delivery id.
pub const DELIVERY_ID_HEADER: &str = "X-Webhook-Delivery";

/// Everything needed to attempt one delivery, snapshotted at emission.
///
/// `body` is the canonical serialization of the emission payload; it is
/// produced exactly once and reused unchanged on every retry. Only the
/// signature changes per attempt, because the signing timestamp is
/// captured at send time.
#[derive(Debug, Clone)]
pub(crate) struct DeliveryJob {
    pub delivery_id: EntityId,
    pub subscription_id: EntityId,
    pub url: String,
    pub secret: String,
    pub event: EventType,
    pub body: Arc<String>,
    /// Attempts made so far; bumped before each execution.
    pub attempts: i32,
}

/// What a single attempt observed.
#[derive(Debug)]
pub(crate) struct AttemptReport {
    /// True only for a 2xx response.
    pub success: bool,
    pub response_code: Option<i16>,
    pub response_body: Option<String>,
    /// Transport-level failure (DNS, refused connection, timeout).
    pub error: Option<String>,
}

/// Performs one signed HTTP POST per call.
pub(crate) struct DeliveryExecutor {
    client: reqwest::Client,
    signature_header: String,
    response_body_cap: usize,
}

impl DeliveryExecutor {
    pub(crate) fn new(config: &EngineConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            signature_header: config.signature_header.clone(),
            response_body_cap: config.response_body_cap,
        }
    }

    /// Execute exactly one POST attempt for the job.
    ///
    /// Never errors: every outcome, including transport failure, is
    /// captured in the returned [`AttemptReport`].
    pub(crate) async fn execute(&self, job: &DeliveryJob) -> AttemptReport {
        let signature = signature::sign(&job.body, &job.secret);

        let result = self
            .client
            .post(&job.url)
            .header(CONTENT_TYPE, "application/json")
            .header(self.signature_header.as_str(), signature)
            .header(EVENT_HEADER, job.event.as_str())
            .header(DELIVERY_ID_HEADER, job.delivery_id.to_string())
            .body(job.body.as_bytes().to_vec())
            .send()
            .await;

        match result {
            Ok(response) => {
                let code = response.status().as_u16() as i16;
                let success = response.status().is_success();
                let body = match response.text().await {
                    Ok(text) => Some(truncate(text, self.response_body_cap)),
                    Err(_) => None,
                };
                AttemptReport {
                    success,
                    response_code: Some(code),
                    response_body: body,
                    error: None,
                }
            }
            Err(e) => AttemptReport {
                success: false,
                response_code: None,
                response_body: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Cap a response body at `cap` characters (char-boundary safe).
fn truncate(text: String, cap: usize) -> String {
    if text.chars().count() <= cap {
        text
    } else {
        text.chars().take(cap).collect()
    }
}

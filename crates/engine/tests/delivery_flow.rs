//! End-to-end delivery tests against real local HTTP endpoints.
//!
//! Each test spins up an axum capture server on an ephemeral port,
//! registers subscriptions against it, emits events, and observes the
//! terminal-outcome channel plus the stored delivery records.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use hookrelay_core::{signature, EventType};
use hookrelay_db::models::{DeliveryStatus, NewSubscription, SubscriptionChanges};
use hookrelay_db::{MemoryWebhookStore, WebhookStore};
use hookrelay_engine::{DeliveryOutcome, EngineConfig, WebhookEngine};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Capture endpoint
// ---------------------------------------------------------------------------

/// Shared state of one capture endpoint.
#[derive(Clone)]
struct Capture {
    hits: Arc<AtomicUsize>,
    /// Headers and raw body of every request, in arrival order.
    requests: Arc<Mutex<Vec<(HeaderMap, String)>>>,
    /// Scripted response statuses; once drained, `default_status` applies.
    script: Arc<Mutex<VecDeque<u16>>>,
    default_status: u16,
}

impl Capture {
    fn new(default_status: u16) -> Self {
        Self {
            hits: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_status,
        }
    }

    fn with_script(default_status: u16, script: &[u16]) -> Self {
        let capture = Self::new(default_status);
        capture.script.lock().unwrap().extend(script.iter().copied());
        capture
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn capture_handler(
    State(capture): State<Capture>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    capture.hits.fetch_add(1, Ordering::SeqCst);
    capture.requests.lock().unwrap().push((headers, body));
    let status = capture
        .script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(capture.default_status);
    StatusCode::from_u16(status).unwrap()
}

/// Serve the capture endpoint on an ephemeral port; returns its URL.
async fn spawn_endpoint(capture: Capture) -> String {
    let app = Router::new()
        .route("/hook", post(capture_handler))
        .with_state(capture);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/hook")
}

// ---------------------------------------------------------------------------
// Engine helpers
// ---------------------------------------------------------------------------

fn test_engine(max_retries: i32, base_delay_ms: u64) -> (Arc<WebhookEngine>, Arc<MemoryWebhookStore>) {
    let store = Arc::new(MemoryWebhookStore::new());
    let config = EngineConfig {
        max_retries,
        base_delay: Duration::from_millis(base_delay_ms),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let engine = WebhookEngine::new(
        Arc::clone(&store) as Arc<dyn WebhookStore>,
        config,
    );
    (Arc::new(engine), store)
}

async fn register(
    engine: &WebhookEngine,
    owner: uuid::Uuid,
    url: &str,
    events: Vec<EventType>,
) -> hookrelay_db::models::WebhookSubscription {
    engine
        .register_webhook(
            owner,
            NewSubscription {
                url: url.into(),
                events,
                secret: None,
                metadata: None,
            },
        )
        .await
        .unwrap()
}

async fn next_outcome(rx: &mut broadcast::Receiver<DeliveryOutcome>) -> DeliveryOutcome {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for a delivery outcome")
        .expect("outcome channel closed")
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn emit_fans_out_to_matching_subscriptions_only() {
    let (engine, store) = test_engine(3, 10);
    let owner = uuid::Uuid::new_v4();

    let capture = Capture::new(200);
    let url = spawn_endpoint(capture.clone()).await;

    let matching_a = register(&engine, owner, &url, vec![EventType::FileCreated]).await;
    let matching_b = register(&engine, owner, &url, vec![EventType::FileCreated]).await;
    let wrong_event = register(&engine, owner, &url, vec![EventType::TaskCompleted]).await;
    let inactive = register(&engine, owner, &url, vec![EventType::FileCreated]).await;
    engine
        .update_webhook(
            owner,
            inactive.id,
            SubscriptionChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut outcomes = engine.subscribe_outcomes();
    engine
        .emit(owner, EventType::FileCreated, serde_json::json!({"path": "/a"}))
        .await
        .unwrap();

    let first = next_outcome(&mut outcomes).await;
    let second = next_outcome(&mut outcomes).await;
    assert_eq!(first.status, DeliveryStatus::Success);
    assert_eq!(second.status, DeliveryStatus::Success);

    // Exactly one delivery per matching subscription, none for the rest.
    let deliveries_a = store.list_deliveries(matching_a.id, 10, 0).await.unwrap();
    let deliveries_b = store.list_deliveries(matching_b.id, 10, 0).await.unwrap();
    assert_eq!(deliveries_a.len(), 1);
    assert_eq!(deliveries_b.len(), 1);
    assert!(store.list_deliveries(wrong_event.id, 10, 0).await.unwrap().is_empty());
    assert!(store.list_deliveries(inactive.id, 10, 0).await.unwrap().is_empty());

    // Distinct delivery ids, shared emission payload.
    assert_ne!(deliveries_a[0].id, deliveries_b[0].id);
    assert_eq!(deliveries_a[0].payload, deliveries_b[0].payload);
    assert_eq!(deliveries_a[0].event, "file.created");
}

#[tokio::test]
async fn emit_with_no_matching_subscription_is_a_silent_no_op() {
    let (engine, _store) = test_engine(3, 10);
    let owner = uuid::Uuid::new_v4();

    // No subscriptions at all: emit succeeds and creates nothing.
    engine
        .emit(owner, EventType::TaskCompleted, serde_json::json!({}))
        .await
        .unwrap();

    assert_eq!(engine.pending_retries(), 0);
}

// ---------------------------------------------------------------------------
// Attempt outcomes and retry policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_attempt_success_is_terminal() {
    let (engine, store) = test_engine(3, 10);
    let owner = uuid::Uuid::new_v4();

    let capture = Capture::new(200);
    let url = spawn_endpoint(capture.clone()).await;
    let sub = register(&engine, owner, &url, vec![EventType::TaskCompleted]).await;

    let mut outcomes = engine.subscribe_outcomes();
    engine
        .emit(owner, EventType::TaskCompleted, serde_json::json!({"task": 1}))
        .await
        .unwrap();

    let outcome = next_outcome(&mut outcomes).await;
    assert_eq!(outcome.status, DeliveryStatus::Success);
    assert_eq!(outcome.attempts, 1);

    let delivery = &store.list_deliveries(sub.id, 10, 0).await.unwrap()[0];
    assert_eq!(delivery.status, "success");
    assert_eq!(delivery.attempts, 1);
    assert_eq!(delivery.response_code, Some(200));
    assert!(delivery.delivered_at.is_some());
    assert!(delivery.last_attempt_at.is_some());
    assert!(delivery.error.is_none());
    assert_eq!(capture.hits(), 1);
}

#[tokio::test]
async fn failing_endpoint_is_retried_exactly_max_retries_times() {
    let (engine, store) = test_engine(3, 10);
    let owner = uuid::Uuid::new_v4();

    let capture = Capture::new(500);
    let url = spawn_endpoint(capture.clone()).await;
    let sub = register(&engine, owner, &url, vec![EventType::TaskFailed]).await;

    let mut outcomes = engine.subscribe_outcomes();
    engine
        .emit(owner, EventType::TaskFailed, serde_json::json!({}))
        .await
        .unwrap();

    let outcome = next_outcome(&mut outcomes).await;
    assert_eq!(outcome.status, DeliveryStatus::Failed);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(capture.hits(), 3);

    let delivery = &store.list_deliveries(sub.id, 10, 0).await.unwrap()[0];
    assert_eq!(delivery.status, "failed");
    assert_eq!(delivery.attempts, 3);
    assert_eq!(delivery.response_code, Some(500));

    // No fourth attempt is ever scheduled.
    assert_eq!(engine.pending_retries(), 0);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(capture.hits(), 3);

    engine.cancel_all_pending();
    assert_eq!(engine.pending_retries(), 0);
}

#[tokio::test]
async fn success_on_second_attempt_stops_retries() {
    let (engine, store) = test_engine(3, 10);
    let owner = uuid::Uuid::new_v4();

    let capture = Capture::with_script(200, &[500]);
    let url = spawn_endpoint(capture.clone()).await;
    let sub = register(&engine, owner, &url, vec![EventType::SessionCompleted]).await;

    let mut outcomes = engine.subscribe_outcomes();
    engine
        .emit(owner, EventType::SessionCompleted, serde_json::json!({}))
        .await
        .unwrap();

    let outcome = next_outcome(&mut outcomes).await;
    assert_eq!(outcome.status, DeliveryStatus::Success);
    assert_eq!(outcome.attempts, 2);

    let delivery = &store.list_deliveries(sub.id, 10, 0).await.unwrap()[0];
    assert_eq!(delivery.status, "success");
    assert_eq!(delivery.attempts, 2);

    // A third attempt never happens.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(capture.hits(), 2);
    assert_eq!(engine.pending_retries(), 0);
}

#[tokio::test]
async fn transport_error_is_recorded_and_counted() {
    // Port 1 on loopback: nothing listens there, connection is refused.
    let (engine, store) = test_engine(1, 10);
    let owner = uuid::Uuid::new_v4();
    let sub = register(
        &engine,
        owner,
        "http://127.0.0.1:1/hook",
        vec![EventType::MessageCreated],
    )
    .await;

    let mut outcomes = engine.subscribe_outcomes();
    engine
        .emit(owner, EventType::MessageCreated, serde_json::json!({}))
        .await
        .unwrap();

    let outcome = next_outcome(&mut outcomes).await;
    assert_eq!(outcome.status, DeliveryStatus::Failed);
    assert_eq!(outcome.attempts, 1);

    let delivery = &store.list_deliveries(sub.id, 10, 0).await.unwrap()[0];
    assert_eq!(delivery.status, "failed");
    assert!(delivery.error.is_some(), "transport error must be captured");
    assert!(delivery.response_code.is_none());
    assert!(delivery.response_body.is_none());
}

// ---------------------------------------------------------------------------
// Payload and signature stability across retries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retried_attempts_send_byte_identical_bodies() {
    let (engine, _store) = test_engine(3, 10);
    let owner = uuid::Uuid::new_v4();

    let capture = Capture::with_script(200, &[500]);
    let url = spawn_endpoint(capture.clone()).await;
    let sub = register(&engine, owner, &url, vec![EventType::StepCompleted]).await;

    let mut outcomes = engine.subscribe_outcomes();
    engine
        .emit(
            owner,
            EventType::StepCompleted,
            serde_json::json!({"step": "render", "index": 4}),
        )
        .await
        .unwrap();
    let outcome = next_outcome(&mut outcomes).await;
    assert_eq!(outcome.attempts, 2);

    let requests = capture.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);

    let (first_headers, first_body) = &requests[0];
    let (second_headers, second_body) = &requests[1];

    // The body bytes are identical; only the signature may differ
    // because its embedded timestamp is the signing time.
    assert_eq!(first_body, second_body);

    let parsed: serde_json::Value = serde_json::from_str(first_body).unwrap();
    assert_eq!(parsed["event"], "step.completed");
    assert_eq!(parsed["data"]["step"], "render");
    assert!(parsed["id"].is_string());
    assert!(parsed["timestamp"].is_string());

    // Both signatures verify against the shared body.
    for headers in [first_headers, second_headers] {
        let sig = headers
            .get("x-webhook-signature")
            .expect("signature header present")
            .to_str()
            .unwrap();
        assert!(signature::verify(first_body, sig, &sub.secret, 300_000));

        assert_eq!(
            headers.get("x-webhook-event").unwrap().to_str().unwrap(),
            "step.completed"
        );
        assert!(headers.get("x-webhook-delivery").is_some());
        assert_eq!(
            headers.get("content-type").unwrap().to_str().unwrap(),
            "application/json"
        );
    }
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_all_pending_stops_scheduled_retries() {
    // Long base delay so the retry timer is still pending when we cancel.
    let (engine, store) = test_engine(3, 60_000);
    let owner = uuid::Uuid::new_v4();

    let capture = Capture::new(500);
    let url = spawn_endpoint(capture.clone()).await;
    let sub = register(&engine, owner, &url, vec![EventType::TaskStarted]).await;

    engine
        .emit(owner, EventType::TaskStarted, serde_json::json!({}))
        .await
        .unwrap();

    // Wait until the first attempt has failed and its retry timer is armed.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while engine.pending_retries() == 0 {
        assert!(tokio::time::Instant::now() < deadline, "retry timer never armed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(engine.pending_retries(), 1);
    let delivery = &store.list_deliveries(sub.id, 10, 0).await.unwrap()[0];
    assert_eq!(delivery.attempts, 1);

    engine.cancel_all_pending();
    assert_eq!(engine.pending_retries(), 0);

    // The cancelled timer never fires a second attempt; the record is
    // left untouched in its non-terminal state.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(capture.hits(), 1);
    let delivery = &store.list_deliveries(sub.id, 10, 0).await.unwrap()[0];
    assert_eq!(delivery.status, "pending");
    assert_eq!(delivery.attempts, 1);
}

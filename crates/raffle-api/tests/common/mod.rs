//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use raffle_core::rng::DeterministicRng;
use raffle_core::store::KeyValueStore;
use raffle_session::application::engine::{self, DrawTiming, EngineDeps};
use raffle_test_support::{FixedClock, RecordingStore, SequenceRng};
use tower::ServiceExt;

use raffle_api::feedback::BroadcastFeedbackSink;
use raffle_api::routes;
use raffle_api::state::AppState;

/// Time to sleep after a draw so the default roll has committed.
pub const PAST_COMMIT: std::time::Duration = std::time::Duration::from_millis(2_100);

/// A running test app plus the handles tests inspect.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<RecordingStore>,
}

impl TestApp {
    /// The full app router, with the same route structure as `main.rs`.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health::router())
            .nest("/api/v1/raffle", routes::raffle::router())
            .with_state(self.state.clone())
    }
}

/// Start an engine over `store` with the given RNG and default timing.
pub async fn spawn_app_with(store: RecordingStore, rng: impl DeterministicRng + 'static) -> TestApp {
    let store = Arc::new(store);
    let feedback = BroadcastFeedbackSink::default();
    let session = engine::start(EngineDeps {
        store: Arc::clone(&store) as Arc<dyn KeyValueStore>,
        rng: Box::new(rng),
        clock: Arc::new(FixedClock::standard()),
        feedback: Arc::new(feedback.clone()),
        timing: DrawTiming::default(),
    })
    .await;
    TestApp {
        state: AppState::new(session, feedback),
        store,
    }
}

/// Start an engine over an empty store whose draws always pick the first name.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(RecordingStore::new(), SequenceRng::new(vec![])).await
}

/// Send a request with an optional JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, Some(body)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "GET", uri, None).await
}

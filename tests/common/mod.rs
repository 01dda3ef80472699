//! Shared helpers for integration tests: a throw-away upstream server.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use plainlegal::pipeline::simplify::{GeminiClient, API_KEY_HEADER};
use plainlegal::PipelineConfig;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_KEY: &str = "test-key-123";

/// What the mock saw on its last request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    delay: Duration,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<Captured>>>,
}

/// A local stand-in for the generative service.
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<Captured>>>,
}

impl MockUpstream {
    /// Answer every request with `status` and `body` after `delay`.
    pub async fn start(status: u16, body: impl Into<String>, delay: Duration) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));
        let state = MockState {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.into(),
            delay,
            hits: hits.clone(),
            last: last.clone(),
        };

        // A fallback route: the model path contains a literal ':'.
        let app = Router::new().fallback(respond).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, hits, last }
    }

    /// `200` with a single candidate carrying `text`.
    pub async fn answering(text: &str) -> Self {
        Self::start(200, candidate_body(text), Duration::ZERO).await
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<Captured> {
        self.last.lock().unwrap().clone()
    }

    pub fn config(&self, timeout_secs: u64) -> PipelineConfig {
        PipelineConfig::builder()
            .api_key(TEST_KEY)
            .endpoint(self.endpoint())
            .api_timeout_secs(timeout_secs)
            .build()
            .unwrap()
    }

    /// Client pointed at this mock, bypassing any proxy from the environment.
    pub fn client(&self, timeout_secs: u64) -> GeminiClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        GeminiClient::with_http_client(&self.config(timeout_secs), http)
    }
}

async fn respond(State(state): State<MockState>, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last.lock().unwrap() = Some(Captured {
        path: uri.path().to_string(),
        api_key: headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (state.status, [(CONTENT_TYPE, "application/json")], state.body).into_response()
}

pub fn candidate_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

pub fn error_body(code: u16, message: &str) -> String {
    serde_json::json!({ "error": { "code": code, "message": message, "status": "ERROR" } }).to_string()
}

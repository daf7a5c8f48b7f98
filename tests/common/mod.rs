//! Shared utilities for integration testing: mock invoke API, mock stats
//! collector and an in-process gateway, all on ephemeral ports.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::Router;
use lambda_http_gateway::lifecycle::{startup, Shutdown};
use lambda_http_gateway::GatewayConfig;
use serde_json::Value;
use tokio::net::TcpListener;

type Reply = Arc<dyn Fn(&str, &Value) -> (u16, Vec<(String, String)>, String) + Send + Sync>;

/// A fake function invoke API that records every envelope it receives.
#[allow(dead_code)]
pub struct MockLambda {
    pub addr: SocketAddr,
    pub envelopes: Arc<Mutex<Vec<(String, Value)>>>,
}

#[allow(dead_code)]
impl MockLambda {
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.envelopes.lock().unwrap().clone()
    }
}

/// Start a mock invoke API. `reply` maps (function, envelope) to the
/// invoke API's status, extra headers and raw payload.
pub async fn start_mock_lambda<F>(reply: F) -> MockLambda
where
    F: Fn(&str, &Value) -> (u16, Vec<(String, String)>, String) + Send + Sync + 'static,
{
    let envelopes = Arc::new(Mutex::new(Vec::new()));
    let state = (envelopes.clone(), Arc::new(reply) as Reply);

    let app = Router::new()
        .route(
            "/2015-03-31/functions/{name}/invocations",
            post(invoke_handler),
        )
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockLambda { addr, envelopes }
}

async fn invoke_handler(
    State((envelopes, reply)): State<(Arc<Mutex<Vec<(String, Value)>>>, Reply)>,
    Path(name): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let envelope: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let (status, headers, payload) = reply(&name, &envelope);
    envelopes.lock().unwrap().push((name, envelope));

    let mut builder = axum::http::Response::builder().status(status);
    for (k, v) in headers {
        builder = builder.header(k, v);
    }
    builder.body(axum::body::Body::from(payload)).unwrap()
}

/// A fake stats collector accepting `PUT /hits/{target}`.
#[allow(dead_code)]
pub struct MockCollector {
    pub addr: SocketAddr,
    /// Every attempt as (target, body, status answered).
    pub attempts: Arc<Mutex<Vec<(String, String, u16)>>>,
    pub status: Arc<AtomicU16>,
}

#[allow(dead_code)]
impl MockCollector {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    /// Bodies of accepted reports for `target`.
    pub fn accepted(&self, target: &str) -> Vec<u64> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _, status)| t == target && (200..300).contains(status))
            .map(|(_, body, _)| body.parse().unwrap())
            .collect()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[allow(dead_code)]
pub async fn start_mock_collector(status: u16) -> MockCollector {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let status = Arc::new(AtomicU16::new(status));
    let state = (attempts.clone(), status.clone());

    let app = Router::new()
        .route("/hits/{target}", put(hits_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockCollector { addr, attempts, status }
}

async fn hits_handler(
    State((attempts, status)): State<(Arc<Mutex<Vec<(String, String, u16)>>>, Arc<AtomicU16>)>,
    Path(target): Path<String>,
    body: String,
) -> StatusCode {
    let status = status.load(Ordering::SeqCst);
    attempts.lock().unwrap().push((target, body, status));
    StatusCode::from_u16(status).unwrap()
}

/// Run a gateway in-process. Returns its address and the shutdown coordinator.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Arc<Shutdown>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Shutdown::new());

    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        startup::serve(&config, listener, &server_shutdown)
            .await
            .expect("gateway failed");
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}

/// Client that never reuses connections across tests.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll `check` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(timeout: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    check()
}

//! In-process mock of the daemon's REST API.
//!
//! [`MockDaemon`] binds an axum server to an ephemeral port on `127.0.0.1`,
//! enforces the `X-API-Key` header the way the real daemon does, and records
//! every request it receives so tests can assert on what went over the wire
//! (or that nothing did).

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// One request as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub api_key: Option<String>,
    pub user_agent: Option<String>,
}

impl RecordedRequest {
    /// Value of the first query parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct MockState {
    api_key: String,
    config: Mutex<Value>,
    log: Mutex<Value>,
    delay: Mutex<Duration>,
    forced: Mutex<Option<(StatusCode, Value)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A running mock daemon. Shuts down when dropped.
pub struct MockDaemon {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
    _handle: JoinHandle<()>,
}

impl MockDaemon {
    /// Start a mock daemon that accepts `api_key`.
    pub async fn start(api_key: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock daemon");
        let addr = listener
            .local_addr()
            .expect("mock daemon has no local addr");

        let state = Arc::new(MockState {
            api_key: api_key.to_string(),
            config: Mutex::new(json!({
                "version": 37,
                "folders": [],
                "devices": [],
                "gui": { "address": addr.to_string(), "apiKey": api_key },
            })),
            log: Mutex::new(json!({ "messages": [] })),
            delay: Mutex::new(Duration::ZERO),
            forced: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(handle_request)
            .with_state(Arc::clone(&state));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            _handle: handle,
        }
    }

    /// `127.0.0.1:<port>`, suitable for a `<gui><address>` element.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Body served for `GET /rest/system/config`.
    pub fn set_config(&self, config: Value) {
        *self.state.config.lock().expect("mock state poisoned") = config;
    }

    /// Body served for `GET /rest/system/log`.
    pub fn set_log(&self, log: Value) {
        *self.state.log.lock().expect("mock state poisoned") = log;
    }

    /// Sleep this long before answering any request.
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().expect("mock state poisoned") = delay;
    }

    /// Answer every authenticated request with `status` and `body`.
    pub fn force_status(&self, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).expect("invalid status code");
        *self.state.forced.lock().expect("mock state poisoned") = Some((status, body));
    }

    /// Snapshot of all requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("mock state poisoned")
            .clone()
    }
}

impl Drop for MockDaemon {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_request(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let api_key = header("x-api-key");

    state
        .requests
        .lock()
        .expect("mock state poisoned")
        .push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            query,
            api_key: api_key.clone(),
            user_agent: header("user-agent"),
        });

    let delay = *state.delay.lock().expect("mock state poisoned");
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if api_key.as_deref() != Some(state.api_key.as_str()) {
        return (StatusCode::FORBIDDEN, "CSRF Error\n").into_response();
    }

    let forced = state.forced.lock().expect("mock state poisoned").clone();
    if let Some((status, body)) = forced {
        return (status, Json(body)).into_response();
    }

    match (method.as_str(), uri.path()) {
        ("GET", "/rest/system/config") => {
            let config = state.config.lock().expect("mock state poisoned").clone();
            Json(config).into_response()
        }
        ("GET", "/rest/system/log") => {
            let log = state.log.lock().expect("mock state poisoned").clone();
            Json(log).into_response()
        }
        ("GET", "/rest/system/status") => {
            Json(json!({ "myID": "MOCKDEV-ICE", "uptime": 42 })).into_response()
        }
        ("GET" | "POST", "/rest/system/ping") => Json(json!({ "ping": "pong" })).into_response(),
        ("POST", "/rest/db/scan") => StatusCode::OK.into_response(),
        _ => (StatusCode::NOT_FOUND, "404 page not found\n").into_response(),
    }
}

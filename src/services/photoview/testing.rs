//! Stub Photoview server for tests.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{addr}")
}

/// A GraphQL request seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub cookie: Option<String>,
    pub body: Value,
}

impl RecordedCall {
    pub fn query(&self) -> &str {
        self.body["query"].as_str().unwrap_or_default()
    }
}

#[derive(Clone)]
struct StubState {
    auth_response: Value,
    responses: Arc<Vec<(&'static str, Value)>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// Photoview lookalike. `authorizeUser` answers with token `T` unless told
/// otherwise; any other document gets the response of the first needle that
/// occurs in its query text, or `{"data": {}}`.
pub struct StubServer {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubServer {
    pub fn default_auth_response() -> Value {
        json!({ "data": { "authorizeUser": { "success": true, "token": "T" } } })
    }

    pub async fn start(responses: Vec<(&'static str, Value)>) -> Self {
        Self::start_with_routes(Self::default_auth_response(), responses, Router::new()).await
    }

    pub async fn with_auth_response(
        auth_response: Value,
        responses: Vec<(&'static str, Value)>,
    ) -> Self {
        Self::start_with_routes(auth_response, responses, Router::new()).await
    }

    /// Start the stub with additional routes, e.g. `/api/photo/{*path}`.
    pub async fn start_with_routes(
        auth_response: Value,
        responses: Vec<(&'static str, Value)>,
        extra: Router,
    ) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            auth_response,
            responses: Arc::new(responses),
            calls: calls.clone(),
        };
        let router = Router::new()
            .route("/api/graphql", post(graphql))
            .with_state(state)
            .merge(extra);
        Self {
            base_url: serve(router).await,
            calls,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Queries seen so far, excluding logins.
    pub fn queries(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(RecordedCall::query)
            .filter(|q| !q.contains("authorizeUser"))
            .map(str::to_string)
            .collect()
    }
}

async fn graphql(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let query = body["query"].as_str().unwrap_or_default().to_string();
    state.calls.lock().push(RecordedCall { cookie, body });

    if query.contains("authorizeUser") {
        return Json(state.auth_response.clone());
    }
    let response = state
        .responses
        .iter()
        .find(|(needle, _)| query.contains(needle))
        .map(|(_, response)| response.clone())
        .unwrap_or_else(|| json!({ "data": {} }));
    Json(response)
}

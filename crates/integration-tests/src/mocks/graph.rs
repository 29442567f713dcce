use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    body::Bytes,
    extract::{OriginalUri, State},
    http::{HeaderMap, HeaderName, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{patch, post},
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// A call the directory API received.
#[derive(Debug, Clone)]
pub struct GraphRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
enum Reply {
    /// 201 echoing the display name under the id `g1`.
    Created,
    Fixed { status: StatusCode, body: String },
}

struct MockState {
    create: Reply,
    owner: (StatusCode, String),
    requests: Mutex<Vec<GraphRequest>>,
}

/// Directory API serving `POST /v1.0/groups`, `PATCH /v1.0/groups/{id}` and
/// `POST /v1.0/groups/{id}/owners/$ref`.
pub struct GraphMock {
    create: Reply,
    owner: (StatusCode, String),
}

impl Default for GraphMock {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphMock {
    pub fn new() -> Self {
        Self {
            create: Reply::Created,
            owner: (StatusCode::NO_CONTENT, String::new()),
        }
    }

    /// Answers group creation with a fixed status and body.
    pub fn with_create_response(mut self, status: u16, body: &str) -> Self {
        self.create = Reply::Fixed {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        };

        self
    }

    /// Answers owner additions with a fixed status and body.
    pub fn with_owner_response(mut self, status: u16, body: &str) -> Self {
        self.owner = (StatusCode::from_u16(status).unwrap(), body.to_string());
        self
    }

    pub async fn spawn(self) -> (MockGraph, CancellationToken) {
        let state = Arc::new(MockState {
            create: self.create,
            owner: self.owner,
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/v1.0/groups", post(create_group))
            .route("/v1.0/groups/{id}", patch(update_group))
            .route("/v1.0/groups/{id}/owners/$ref", post(add_owner))
            .with_state(state.clone());

        let (address, shutdown) = super::spawn_router(router).await;

        (MockGraph { address, state }, shutdown)
    }
}

/// Handle to a running directory API mock.
#[derive(Clone)]
pub struct MockGraph {
    address: SocketAddr,
    state: Arc<MockState>,
}

impl MockGraph {
    pub fn graph_url(&self) -> String {
        format!("http://{}/v1.0", self.address)
    }

    /// The URL the portal binds owners with.
    pub fn directory_object_url(&self, id: &str) -> String {
        format!("{}/directoryObjects/{id}", self.graph_url())
    }

    pub fn requests(&self) -> Vec<GraphRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn record(state: &MockState, method: Method, uri: &OriginalUri, headers: &HeaderMap, body: &Bytes) {
    state.requests.lock().unwrap().push(GraphRequest {
        method,
        path: uri.path().to_string(),
        authorization: header_value(headers, header::AUTHORIZATION),
        content_type: header_value(headers, header::CONTENT_TYPE),
        body: serde_json::from_slice(body).unwrap_or(serde_json::Value::Null),
    });
}

async fn create_group(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method, &uri, &headers, &body);

    match &state.create {
        Reply::Created => {
            let request: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();

            let created = json!({
                "id": "g1",
                "displayName": request["displayName"],
                "mailNickname": request["mailNickname"],
                "securityEnabled": true,
                "mailEnabled": false,
            });

            (StatusCode::CREATED, axum::Json(created)).into_response()
        }
        Reply::Fixed { status, body } => (*status, body.clone()).into_response(),
    }
}

async fn add_owner(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method, &uri, &headers, &body);

    let (status, body) = state.owner.clone();
    (status, body).into_response()
}

async fn update_group(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    record(&state, method, &uri, &headers, &body);
    StatusCode::NO_CONTENT
}

use std::{
    collections::BTreeMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// A token request as the identity provider received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub tenant: String,
    pub form: BTreeMap<String, String>,
}

#[derive(Clone)]
enum Mode {
    Issue(String),
    Reject { status: StatusCode, body: serde_json::Value },
}

struct MockState {
    mode: Mode,
    requests: Mutex<Vec<TokenRequest>>,
}

/// Identity provider answering `POST /{tenant}/oauth2/v2.0/token`.
pub struct IdentityMock {
    mode: Mode,
}

impl Default for IdentityMock {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityMock {
    /// Issues the bearer token `test-token` to every caller.
    pub fn new() -> Self {
        Self {
            mode: Mode::Issue("test-token".to_string()),
        }
    }

    /// Rejects the client credentials like the real endpoint does.
    pub fn rejecting() -> Self {
        Self {
            mode: Mode::Reject {
                status: StatusCode::UNAUTHORIZED,
                body: json!({
                    "error": "invalid_client",
                    "error_description": "AADSTS7000215: Invalid client secret provided."
                }),
            },
        }
    }

    /// Answers 200 without an `access_token`.
    pub fn without_token() -> Self {
        Self {
            mode: Mode::Reject {
                status: StatusCode::OK,
                body: json!({ "token_type": "Bearer", "expires_in": 3599 }),
            },
        }
    }

    pub async fn spawn(self) -> (MockIdentityProvider, CancellationToken) {
        let state = Arc::new(MockState {
            mode: self.mode,
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/{tenant}/oauth2/v2.0/token", post(token))
            .with_state(state.clone());

        let (address, shutdown) = super::spawn_router(router).await;

        (MockIdentityProvider { address, state }, shutdown)
    }
}

/// Handle to a running identity provider mock.
#[derive(Clone)]
pub struct MockIdentityProvider {
    address: SocketAddr,
    state: Arc<MockState>,
}

impl MockIdentityProvider {
    pub fn authority(&self) -> String {
        format!("http://{}", self.address)
    }

    pub fn requests(&self) -> Vec<TokenRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

async fn token(
    State(state): State<Arc<MockState>>,
    Path(tenant): Path<String>,
    Form(form): Form<BTreeMap<String, String>>,
) -> Response {
    state.requests.lock().unwrap().push(TokenRequest { tenant, form });

    match &state.mode {
        Mode::Issue(token) => Json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": token,
        }))
        .into_response(),
        Mode::Reject { status, body } => (*status, Json(body.clone())).into_response(),
    }
}

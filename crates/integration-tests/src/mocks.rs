//! Stand-ins for the identity provider and the directory API.

mod graph;
mod identity;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use graph::{GraphMock, GraphRequest, MockGraph};
pub use identity::{IdentityMock, MockIdentityProvider, TokenRequest};

/// Serves `router` on an ephemeral local port until the returned token is cancelled.
pub(crate) async fn spawn_router(router: Router) -> (SocketAddr, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { signal.cancelled().await })
            .await
            .unwrap();
    });

    (address, shutdown)
}

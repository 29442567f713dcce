use std::time::Duration;

use http::{HeaderMap, HeaderValue, header::CONNECTION};
use reqwest::Client;

use crate::error::DirectoryError;

fn default_http_client_builder() -> reqwest::ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    Client::builder()
        .timeout(Duration::from_secs(60))
        // Short idle timeout so pooled connections pick up DNS changes of the identity provider
        // and Graph front doors.
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
}

/// HTTP client shared by token requests and directory calls. Build it once per process.
pub fn build_http_client() -> crate::Result<Client> {
    default_http_client_builder().build().map_err(|e| {
        log::error!("Failed to create HTTP client: {e}");
        DirectoryError::Transport(format!("failed to create HTTP client: {e}"))
    })
}

use reqwest::{
    Client, Method, RequestBuilder, Response,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::{
    error::DirectoryError,
    token::{AccessToken, TokenProvider},
};

/// A directory API client bound to one bearer token.
///
/// Obtaining a client always means a token round-trip; there is no caching across clients.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: String,
    token: AccessToken,
}

impl DirectoryClient {
    /// Fetches a token and binds it. Fails when the token cannot be obtained.
    pub async fn connect(tokens: &dyn TokenProvider, http: Client, base_url: impl Into<String>) -> crate::Result<Self> {
        let token = tokens.fetch_token().await?;

        Ok(Self::with_token(token, http, base_url))
    }

    pub fn with_token(token: AccessToken, http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { http, base_url, token }
    }

    /// Reference URL of a directory object, as used in `@odata.bind` and `@odata.id`.
    pub fn directory_object_url(&self, id: &str) -> String {
        format!("{}/directoryObjects/{id}", self.base_url)
    }

    pub async fn post<T>(&self, endpoint: &str, body: &T) -> crate::Result<Response>
    where
        T: Serialize + ?Sized,
    {
        self.send(Method::POST, endpoint, body).await
    }

    pub async fn patch<T>(&self, endpoint: &str, body: &T) -> crate::Result<Response>
    where
        T: Serialize + ?Sized,
    {
        self.send(Method::PATCH, endpoint, body).await
    }

    async fn send<T>(&self, method: Method, endpoint: &str, body: &T) -> crate::Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)
            .map_err(|e| DirectoryError::InvalidRequest(format!("Failed to serialize request: {e}")))?;

        log::debug!("{method} {}{endpoint}", self.base_url);

        self.request(method.clone(), endpoint)
            .body(body)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(format!("Failed to send {method} {endpoint}: {e}")))
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{endpoint}", self.base_url);

        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token.secret().expose_secret()))
            .header(CONTENT_TYPE, "application/json")
    }
}

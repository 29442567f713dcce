use std::fmt;

use async_trait::async_trait;
use config::DirectoryConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::DirectoryError;

/// Bearer token for the directory API.
///
/// Never logged: `Debug` is redacted and the value is only reachable through [`AccessToken::secret`].
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Source of directory API tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a fresh token. Implementations do not cache.
    async fn fetch_token(&self) -> crate::Result<AccessToken>;
}

/// OAuth2 client-credential grant against the tenant's v2 token endpoint.
pub struct ClientCredentialProvider {
    client: Client,
    endpoint: String,
    client_id: String,
    client_secret: SecretString,
    scope: String,
}

impl ClientCredentialProvider {
    pub fn new(config: &DirectoryConfig, client: Client) -> Self {
        Self {
            client,
            endpoint: config.token_endpoint(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: SecretString,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl fmt::Display for TokenErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => f.write_str(&self.error),
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialProvider {
    async fn fetch_token(&self) -> crate::Result<AccessToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                log::error!("Error getting access token: {e}");
                DirectoryError::TokenAcquisition(format!("failed to reach identity provider: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(error) => error.to_string(),
                Err(_) => body,
            };

            log::error!("Error getting access token ({status}): {reason}");

            return Err(DirectoryError::TokenAcquisition(format!(
                "identity provider returned {status}: {reason}"
            )));
        }

        let token = response.json::<TokenResponse>().await.map_err(|e| {
            log::error!("Error getting access token: unreadable token response: {e}");
            DirectoryError::TokenAcquisition(format!("unreadable token response: {e}"))
        })?;

        if token.access_token.expose_secret().is_empty() {
            log::error!("Error getting access token: identity provider returned an empty token");
            return Err(DirectoryError::TokenAcquisition("empty access token".to_string()));
        }

        match token.expires_in {
            Some(seconds) => log::debug!("Acquired directory API token valid for {seconds}s"),
            None => log::debug!("Acquired directory API token"),
        }

        Ok(AccessToken(token.access_token))
    }
}

//! Identity provider and directory API settings.

use secrecy::SecretString;
use serde::Deserialize;

pub(crate) const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
pub(crate) const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";
pub(crate) const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Application credentials and endpoints used to manage groups.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Directory (tenant) identifier.
    pub tenant_id: String,
    /// Application (client) identifier.
    pub client_id: String,
    /// Application client secret.
    pub client_secret: SecretString,
    /// Identity provider base URL. The token endpoint is `{authority}/{tenant_id}/oauth2/v2.0/token`.
    #[serde(default = "default_authority")]
    pub authority: String,
    /// Directory API v1 root.
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    /// Scope requested with the client-credential grant.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// How the creating user becomes the owner of a new group.
    #[serde(default)]
    pub owner_binding: OwnerBinding,
}

impl DirectoryConfig {
    pub(crate) fn new(tenant_id: String, client_id: String, client_secret: SecretString) -> Self {
        Self {
            tenant_id,
            client_id,
            client_secret,
            authority: default_authority(),
            graph_url: default_graph_url(),
            scope: default_scope(),
            owner_binding: OwnerBinding::default(),
        }
    }

    /// The OAuth2 v2 token endpoint of the configured tenant.
    pub fn token_endpoint(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

/// Where the owner relationship of a new group is established.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerBinding {
    /// `owners@odata.bind` in the creation payload.
    #[default]
    Inline,
    /// A separate `owners/$ref` call once the group exists.
    FollowUp,
}

fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

fn default_graph_url() -> String {
    DEFAULT_GRAPH_URL.to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

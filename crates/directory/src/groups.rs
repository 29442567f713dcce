mod name;

use std::sync::Arc;

use config::{DirectoryConfig, OwnerBinding};
use reqwest::{Client, StatusCode};

pub use self::name::{GroupName, GroupNameError, MAX_GROUP_NAME_LENGTH, mail_nickname};

use crate::{
    client::DirectoryClient,
    error::DirectoryError,
    messages::{AddOwnerRequest, CreateGroupRequest, CreatedGroupResponse},
    token::TokenProvider,
};

/// Outcome of the owner part of a group creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerAssignment {
    /// No owner was requested.
    Unassigned,
    /// The owner relationship exists.
    Bound(String),
    /// The group exists but the follow-up owner call failed.
    Failed(String),
}

/// A group the directory accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedGroup {
    /// Object id of the new group, when the response carried one.
    pub id: Option<String>,
    pub display_name: String,
    pub owner: OwnerAssignment,
}

impl CreatedGroup {
    pub fn message(&self) -> String {
        let name = &self.display_name;

        match &self.owner {
            OwnerAssignment::Unassigned => format!("Security group '{name}' created successfully"),
            OwnerAssignment::Bound(owner) => format!("Security group '{name}' created successfully with owner {owner}"),
            OwnerAssignment::Failed(owner) => {
                format!("Security group '{name}' created successfully, but owner {owner} could not be added")
            }
        }
    }
}

/// Security group operations against the directory API.
#[derive(Clone)]
pub struct GroupService {
    tokens: Arc<dyn TokenProvider>,
    http: Client,
    graph_url: String,
    owner_binding: OwnerBinding,
}

impl GroupService {
    pub fn new(config: &DirectoryConfig, tokens: Arc<dyn TokenProvider>, http: Client) -> Self {
        Self {
            tokens,
            http,
            graph_url: config.graph_url.clone(),
            owner_binding: config.owner_binding,
        }
    }

    /// Acquires a token and binds it to a new client.
    pub async fn connect(&self) -> crate::Result<DirectoryClient> {
        DirectoryClient::connect(self.tokens.as_ref(), self.http.clone(), self.graph_url.as_str()).await
    }

    /// Creates a non-mail-enabled security group, optionally owned by `owner_id`.
    ///
    /// With inline owner binding the owner travels in the creation payload. With follow-up
    /// binding a failed owner call still yields a created group, marked [`OwnerAssignment::Failed`].
    pub async fn create_security_group(&self, name: &GroupName, owner_id: Option<&str>) -> crate::Result<CreatedGroup> {
        let client = self.connect().await?;

        let mut request = CreateGroupRequest::security_group(name.as_str(), name.mail_nickname());

        if let Some(owner_id) = owner_id
            && self.owner_binding == OwnerBinding::Inline
        {
            request = request.with_owner(client.directory_object_url(owner_id));
        }

        let response = client.post("/groups", &request).await.inspect_err(|e| {
            log::error!("Error creating group: {e}");
        })?;

        let status = response.status();

        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Failed to create group. Status code: {status}, Response: {body}");

            return Err(DirectoryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let id = match response.json::<CreatedGroupResponse>().await {
            Ok(created) => created.id,
            Err(e) => {
                log::warn!("Group '{name}' was created but the response could not be parsed: {e}");
                None
            }
        };

        log::info!(
            "Successfully created group: {name}, ID: {}",
            id.as_deref().unwrap_or("Unknown")
        );

        let owner = match owner_id {
            None => OwnerAssignment::Unassigned,
            Some(owner_id) if !request.owners.is_empty() => OwnerAssignment::Bound(owner_id.to_string()),
            Some(owner_id) => match id.as_deref() {
                Some(group_id) if self.add_owner_with(&client, group_id, owner_id).await => {
                    OwnerAssignment::Bound(owner_id.to_string())
                }
                Some(_) => OwnerAssignment::Failed(owner_id.to_string()),
                None => {
                    log::warn!("Cannot add owner {owner_id} to group '{name}': the group id is unknown");
                    OwnerAssignment::Failed(owner_id.to_string())
                }
            },
        };

        Ok(CreatedGroup {
            id,
            display_name: name.to_string(),
            owner,
        })
    }

    /// Adds `owner_id` to the owners of `group_id` with a fresh token. Success is HTTP 204.
    pub async fn add_group_owner(&self, group_id: &str, owner_id: &str) -> bool {
        match self.connect().await {
            Ok(client) => self.add_owner_with(&client, group_id, owner_id).await,
            Err(e) => {
                log::warn!("Cannot add owner {owner_id} to group {group_id}: {e}");
                false
            }
        }
    }

    async fn add_owner_with(&self, client: &DirectoryClient, group_id: &str, owner_id: &str) -> bool {
        let request = AddOwnerRequest {
            odata_id: client.directory_object_url(owner_id),
        };

        let endpoint = format!("/groups/{group_id}/owners/$ref");

        match client.post(&endpoint, &request).await {
            Ok(response) if response.status() == StatusCode::NO_CONTENT => {
                log::info!("Added owner {owner_id} to group {group_id}");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                log::warn!("Failed to add owner {owner_id} to group {group_id}. Status code: {status}, Response: {body}");
                false
            }
            Err(e) => {
                log::warn!("Failed to add owner {owner_id} to group {group_id}: {e}");
                false
            }
        }
    }
}

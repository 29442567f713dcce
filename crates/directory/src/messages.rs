//! Request and response bodies of the group endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /groups` for a non-mail-enabled security group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub display_name: String,
    pub mail_nickname: String,
    pub security_enabled: bool,
    pub mail_enabled: bool,
    /// Empty for security groups; `["Unified"]` would make a Microsoft 365 group.
    pub group_types: Vec<String>,
    /// Directory object URLs of the initial owners.
    #[serde(rename = "owners@odata.bind", skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
}

impl CreateGroupRequest {
    pub fn security_group(display_name: &str, mail_nickname: String) -> Self {
        Self {
            display_name: display_name.to_string(),
            mail_nickname,
            security_enabled: true,
            mail_enabled: false,
            group_types: Vec::new(),
            owners: Vec::new(),
        }
    }

    pub fn with_owner(mut self, directory_object_url: String) -> Self {
        self.owners.push(directory_object_url);
        self
    }
}

/// The parts of a created group the portal reads back.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGroupResponse {
    #[serde(default)]
    pub id: Option<String>,
}

/// Body of `POST /groups/{id}/owners/$ref`.
#[derive(Debug, Clone, Serialize)]
pub struct AddOwnerRequest {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

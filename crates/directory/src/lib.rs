//! Microsoft Graph access: client-credential tokens, a bearer-bound HTTP client and the
//! security group operations built on top of them.

mod client;
mod error;
mod groups;
mod http_client;
mod messages;
mod token;

pub use client::DirectoryClient;
pub use error::{DirectoryError, DirectoryResult as Result};
pub use groups::{
    CreatedGroup, GroupName, GroupNameError, GroupService, MAX_GROUP_NAME_LENGTH,
    OwnerAssignment, mail_nickname,
};
pub use http_client::build_http_client;
pub use messages::{AddOwnerRequest, CreateGroupRequest, CreatedGroupResponse};
pub use token::{AccessToken, ClientCredentialProvider, TokenProvider};

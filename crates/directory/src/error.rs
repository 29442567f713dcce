use thiserror::Error;

pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

/// Failures talking to the identity provider or the directory API.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The identity provider did not issue a token.
    #[error("Failed to acquire access token: {0}")]
    TokenAcquisition(String),

    /// Network or connection error.
    #[error("Connection error: {0}")]
    Transport(String),

    /// The directory API answered with an unexpected status.
    #[error("Directory API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The request body could not be serialized.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A response body could not be read or parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DirectoryError {
    /// Message shown to the portal user when group creation fails.
    ///
    /// Token failures stay generic; directory API failures carry the raw response body.
    pub fn client_message(&self) -> String {
        match self {
            Self::TokenAcquisition(_) => "Failed to initialize Graph client".to_string(),
            Self::Api { body, .. } => format!("Failed to create group: {body}"),
            other => format!("Error creating group: {other}"),
        }
    }
}

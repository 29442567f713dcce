use std::fmt;

use http::HeaderMap;

use crate::principal::ClientPrincipal;

/// Header carrying the signed-in user's directory object id.
pub const CLIENT_PRINCIPAL_ID: &str = "x-ms-client-principal-id";

/// Header carrying the base64-encoded JSON claims of the signed-in user.
pub const CLIENT_PRINCIPAL: &str = "x-ms-client-principal";

/// Directory object id of the user submitting the request.
///
/// Taken from headers set by the platform's authentication proxy. The value is trusted as-is;
/// nothing here verifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(object_id: impl Into<String>) -> Self {
        Self(object_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the caller from the trusted headers.
///
/// The direct id header wins and the claims header is not decoded when it is present.
/// Returns `None` when neither header yields an id.
pub fn current_user_id(headers: &HeaderMap) -> Option<CallerIdentity> {
    if let Some(id) = header_str(headers, CLIENT_PRINCIPAL_ID) {
        return Some(CallerIdentity::new(id));
    }

    let encoded = header_str(headers, CLIENT_PRINCIPAL)?;

    let principal = match ClientPrincipal::decode(encoded) {
        Ok(principal) => principal,
        Err(err) => {
            log::debug!("Ignoring unreadable {CLIENT_PRINCIPAL} header: {err}");
            return None;
        }
    };

    principal.object_id().map(CallerIdentity::new)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let value = headers.get(name)?;

    match value.to_str() {
        Ok(value) if !value.trim().is_empty() => Some(value.trim()),
        Ok(_) => None,
        Err(_) => {
            log::debug!("Ignoring non-ASCII {name} header");
            None
        }
    }
}

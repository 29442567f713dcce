//! Per-request context derived from headers injected by the front-door authentication proxy.

mod caller_identity;
mod principal;

pub use caller_identity::{CLIENT_PRINCIPAL, CLIENT_PRINCIPAL_ID, CallerIdentity, current_user_id};
pub use principal::{ClientPrincipal, PrincipalClaim, PrincipalError};

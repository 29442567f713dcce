use std::collections::HashMap;

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::Deserialize;
use serde_json::Value;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Claim names holding the directory object id, most specific first.
const OBJECT_ID_CLAIMS: &[&str] = &["oid", "http://schemas.microsoft.com/identity/claims/objectidentifier"];

/// Claim names holding the token subject, used when no object id is present.
const SUBJECT_CLAIMS: &[&str] = &["sub", "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier"];

/// Decoded client principal header.
///
/// Accepts both a flat claims object (`{"oid": "..."}`) and the App Service envelope
/// (`{"auth_typ": "aad", "claims": [{"typ": "oid", "val": "..."}]}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientPrincipal {
    /// Identity provider that authenticated the user, e.g. `aad`.
    #[serde(default)]
    pub auth_typ: Option<String>,

    /// Claims in the App Service envelope.
    #[serde(default)]
    pub claims: Vec<PrincipalClaim>,

    /// Top-level claims of a flat principal.
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrincipalClaim {
    pub typ: String,
    pub val: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PrincipalError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid claims JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientPrincipal {
    /// Decodes a base64 JSON header value. Standard and URL-safe alphabets are accepted, with or
    /// without padding.
    pub fn decode(encoded: &str) -> Result<Self, PrincipalError> {
        let encoded = encoded.trim();

        let bytes = match STANDARD_LENIENT.decode(encoded) {
            Ok(bytes) => bytes,
            Err(standard_err) => URL_SAFE_LENIENT.decode(encoded).map_err(|_| standard_err)?,
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The directory object id, falling back to the subject claim.
    pub fn object_id(&self) -> Option<String> {
        OBJECT_ID_CLAIMS
            .iter()
            .chain(SUBJECT_CLAIMS)
            .find_map(|name| self.get_claim(name))
    }

    /// Looks a claim up in the flat claims first, then in the envelope.
    pub fn get_claim(&self, name: &str) -> Option<String> {
        let flat = match self.additional.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        flat.or_else(|| {
            self.claims
                .iter()
                .find(|claim| claim.typ.eq_ignore_ascii_case(name))
                .map(|claim| claim.val.clone())
        })
        .filter(|value| !value.trim().is_empty())
    }
}

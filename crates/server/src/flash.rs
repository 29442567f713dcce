//! One-shot notices carried across the post/redirect/get cycle in a signed cookie.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use http::{HeaderMap, HeaderValue, header::COOKIE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub(crate) const COOKIE_NAME: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FlashCategory {
    Success,
    Warning,
    Error,
}

impl FlashCategory {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FlashMessage {
    pub category: FlashCategory,
    pub message: String,
}

impl FlashMessage {
    pub(crate) fn success(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Success,
            message: message.into(),
        }
    }

    pub(crate) fn warning(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Warning,
            message: message.into(),
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Error,
            message: message.into(),
        }
    }
}

/// HMAC key for flash cookies.
pub(crate) struct FlashKey(Vec<u8>);

impl fmt::Debug for FlashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FlashKey([REDACTED])")
    }
}

impl FlashKey {
    pub(crate) fn from_secret(secret: &SecretString) -> Self {
        Self(secret.expose_secret().as_bytes().to_vec())
    }

    /// A key that only lives as long as the process.
    pub(crate) fn random() -> Self {
        Self(rand::random::<[u8; 32]>().to_vec())
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length, including empty ones.
        HmacSha256::new_from_slice(&self.0).expect("HMAC can take key of any size")
    }

    /// Encodes messages as `payload.signature`, both URL-safe base64.
    pub(crate) fn seal(&self, messages: &[FlashMessage]) -> String {
        let json = serde_json::to_vec(messages).unwrap_or_else(|_| b"[]".to_vec());
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{payload}.{signature}")
    }

    /// Returns the messages of a cookie value, or `None` when it is malformed or not signed by this key.
    pub(crate) fn open(&self, value: &str) -> Option<Vec<FlashMessage>> {
        let (payload, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());

        if mac.verify_slice(&signature).is_err() {
            log::debug!("Ignoring flash cookie with an invalid signature");
            return None;
        }

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// The raw value of the flash cookie in the request, if any.
pub(crate) fn cookie_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

pub(crate) fn set_cookie(key: &FlashKey, messages: &[FlashMessage]) -> HeaderValue {
    let cookie = format!("{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax", key.seal(messages));

    // base64url and the fixed attributes are always valid header characters.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| clear_cookie())
}

pub(crate) fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

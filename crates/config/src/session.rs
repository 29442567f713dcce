use secrecy::SecretString;
use serde::Deserialize;

/// Browser session settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Key used to sign flash message cookies. A random per-process key is used when unset,
    /// which invalidates pending messages on restart.
    pub secret: Option<SecretString>,
}

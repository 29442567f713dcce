mod directory;
mod env;
mod error;
mod loader;
mod server;
mod session;

use std::path::Path;

use serde::Deserialize;

pub use directory::{DirectoryConfig, OwnerBinding};
pub use error::Error;
pub use server::{DEFAULT_PORT, HealthConfig, ServerConfig, TlsConfig};
pub use session::SessionConfig;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub directory: DirectoryConfig,
}

impl Config {
    /// Loads a TOML configuration file, expanding `{{ env.NAME }}` placeholders.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
        loader::load(path)
    }

    /// Builds the configuration from the process environment only.
    ///
    /// Reads `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET` (required),
    /// `SECRET_KEY` and `PORT` (optional).
    pub fn from_env() -> crate::Result<Config> {
        env::load()
    }
}

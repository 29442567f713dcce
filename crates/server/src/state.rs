use std::sync::Arc;

use config::Config;
use directory::{ClientCredentialProvider, GroupService, TokenProvider};

use crate::flash::FlashKey;

/// Immutable state shared by every request.
#[derive(Clone)]
pub(crate) struct AppState {
    pub groups: GroupService,
    pub flash_key: Arc<FlashKey>,
}

impl AppState {
    pub(crate) fn new(config: &Config) -> crate::Result<Self> {
        let http = directory::build_http_client()?;
        let tokens: Arc<dyn TokenProvider> = Arc::new(ClientCredentialProvider::new(&config.directory, http.clone()));

        let flash_key = match &config.session.secret {
            Some(secret) => FlashKey::from_secret(secret),
            None => {
                log::warn!("No session secret configured; flash messages are signed with a per-process key");
                FlashKey::random()
            }
        };

        Ok(Self {
            groups: GroupService::new(&config.directory, tokens, http),
            flash_key: Arc::new(flash_key),
        })
    }
}

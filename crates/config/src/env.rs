//! Configuration taken straight from the process environment, the way App Service hosts pass settings.

use std::net::SocketAddr;

use secrecy::SecretString;

use crate::{Config, DirectoryConfig, ServerConfig, SessionConfig, error::Error, loader};

const TENANT_ID: &str = "AZURE_TENANT_ID";
const CLIENT_ID: &str = "AZURE_CLIENT_ID";
const CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
const SESSION_SECRET: &str = "SECRET_KEY";
const PORT: &str = "PORT";

pub(crate) fn load() -> crate::Result<Config> {
    let mut missing = Vec::new();

    let mut required = |name: &str| match non_blank(name) {
        Some(value) => value,
        None => {
            missing.push(name.to_string());
            String::new()
        }
    };

    let tenant_id = required(TENANT_ID);
    let client_id = required(CLIENT_ID);
    let client_secret = required(CLIENT_SECRET);

    if !missing.is_empty() {
        return Err(Error::MissingEnvironment(missing));
    }

    let port = match non_blank(PORT) {
        Some(port) => port
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::Invalid(format!("{PORT} must be a valid port number, got '{port}'")))?,
        None => crate::DEFAULT_PORT,
    };

    let config = Config {
        server: ServerConfig {
            listen_address: Some(SocketAddr::from(([0, 0, 0, 0], port))),
            ..Default::default()
        },
        session: SessionConfig {
            secret: non_blank(SESSION_SECRET).map(SecretString::from),
        },
        directory: DirectoryConfig::new(tenant_id, client_id, SecretString::from(client_secret)),
    };

    loader::validate(&config)?;

    Ok(config)
}

fn non_blank(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

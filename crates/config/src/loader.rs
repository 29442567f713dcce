use std::{fmt::Write, path::Path, str::FromStr};

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;
use url::Url;

use crate::{Config, error::Error};

pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let path = path.as_ref().to_path_buf();
    let content = std::fs::read_to_string(&path)?;
    let mut raw_config: Value = toml::from_str(&content)?;

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;
    validate(&config)?;

    Ok(config)
}

/// Checks the values serde cannot: blank credentials, malformed URLs, bad paths.
pub(crate) fn validate(config: &Config) -> crate::Result<()> {
    let directory = &config.directory;

    let blank = [
        ("directory.tenant_id", directory.tenant_id.as_str()),
        ("directory.client_id", directory.client_id.as_str()),
        ("directory.client_secret", directory.client_secret.expose_secret()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect::<Vec<_>>();

    if !blank.is_empty() {
        return Err(Error::Invalid(format!("{} must not be empty", blank.join(", "))));
    }

    if directory.tenant_id.contains('/') {
        return Err(Error::Invalid(format!(
            "directory.tenant_id must not contain '/', got '{}'",
            directory.tenant_id
        )));
    }

    validate_url("directory.authority", &directory.authority)?;
    validate_url("directory.graph_url", &directory.graph_url)?;

    if let Some(secret) = &config.session.secret
        && secret.expose_secret().is_empty()
    {
        return Err(Error::Invalid("session.secret must not be empty".to_string()));
    }

    let health = &config.server.health;

    if health.enabled && !health.path.starts_with('/') {
        return Err(Error::Invalid(format!(
            "server.health.path must start with '/', got '{}'",
            health.path
        )));
    }

    if health.enabled && health.path.contains([':', '*', '{', '}']) {
        return Err(Error::Invalid(format!(
            "server.health.path must be a literal path without ':', '*', '{{' or '}}', got '{}'",
            health.path
        )));
    }

    if health.enabled && matches!(health.path.as_str(), "/" | "/create_group") {
        return Err(Error::Invalid(format!(
            "server.health.path '{}' collides with a portal route",
            health.path
        )));
    }

    Ok(())
}

fn validate_url(name: &str, value: &str) -> crate::Result<()> {
    let url = Url::parse(value).map_err(|e| Error::Invalid(format!("{name} is not a valid URL ({e}): '{value}'")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::Invalid(format!(
            "{name} must use http or https, got '{scheme}'"
        ))),
    }
}

fn expand_dynamic_strings<'a>(path: &mut Vec<Result<&'a str, usize>>, value: &'a mut Value) -> crate::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(reason) => {
                let mut p = String::new();

                for segment in path.iter() {
                    match segment {
                        Ok(s) => {
                            p.push_str(s);
                            p.push('.');
                        }
                        Err(i) => {
                            let _ = write!(p, "[{i}]");
                        }
                    }
                }

                if p.ends_with('.') {
                    p.pop();
                }

                return Err(Error::EnvVarSubstitution { path: p, reason });
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}

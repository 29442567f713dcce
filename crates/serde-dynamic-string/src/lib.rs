//! Strings with `{{ env.NAME }}` placeholders, expanded when parsed.
//!
//! ```text
//! client_secret = "{{ env.AZURE_CLIENT_SECRET }}"
//! ```

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer, de::Error as _};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .expect("placeholder pattern should be valid")
});

/// A value whose textual form had its placeholders substituted before parsing into `T`.
#[derive(Clone, PartialEq, Eq)]
pub struct DynamicString<T>(T);

impl<T> DynamicString<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for DynamicString<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicString<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T> FromStr for DynamicString<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expanded = expand(s)?;
        let value = expanded.parse::<T>().map_err(|err| err.to_string())?;

        Ok(Self(value))
    }
}

impl<'de, T> Deserialize<'de> for DynamicString<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

fn expand(input: &str) -> Result<String, String> {
    let mut error = None;

    let output = PLACEHOLDER.replace_all(input, |captures: &Captures<'_>| {
        let namespace = &captures[1];
        let name = &captures[2];

        let resolved = match namespace {
            "env" => std::env::var(name).map_err(|_| format!("environment variable not found: `{name}`")),
            other => Err(format!("unknown placeholder namespace `{other}`, only `env` is supported")),
        };

        match resolved {
            Ok(value) => value,
            Err(err) => {
                error.get_or_insert(err);
                String::new()
            }
        }
    });

    match error {
        Some(err) => Err(err),
        None => Ok(output.into_owned()),
    }
}

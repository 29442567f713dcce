use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, ValueEnum};
use server::LogStyle;

/// Self-service creation of Entra ID security groups
#[derive(Debug, Parser)]
#[command(name = "group-portal", version)]
pub struct Args {
    /// Path to the TOML configuration. Without it the configuration is read from
    /// AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, SECRET_KEY and PORT.
    #[arg(short, long, env = "GROUP_PORTAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides the listen address of the configuration
    #[arg(long, env = "GROUP_PORTAL_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,

    /// Log filter, e.g. "info" or "server=debug,directory=debug"
    #[arg(long, env = "GROUP_PORTAL_LOG", default_value = "info")]
    pub log: String,

    #[arg(long, env = "GROUP_PORTAL_LOG_STYLE", value_enum, default_value_t = LogStyleArg::Text)]
    pub log_style: LogStyleArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogStyleArg {
    Text,
    Json,
}

impl From<LogStyleArg> for LogStyle {
    fn from(value: LogStyleArg) -> Self {
        match value {
            LogStyleArg::Text => LogStyle::Text,
            LogStyleArg::Json => LogStyle::Json,
        }
    }
}

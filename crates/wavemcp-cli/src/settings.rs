//! Connection settings from config file and environment
//!
//! Precedence, highest first: command-line flags, `WAVEMCP_*` environment
//! variables, the config file, built-in defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use wavemcp_client::{SessionConfig, TransportConfig};

use crate::cli::Connection;
use crate::error::{CliError, CliResult};

/// Timeout used when neither a flag nor the settings give one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings read from the config file and `WAVEMCP_*` variables
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server URL
    pub url: Option<String>,
    /// Connect and request timeout in seconds
    pub timeout: Option<u64>,
    /// Protocol version to offer in the handshake
    pub protocol_version: Option<String>,
    /// Headers for the WebSocket upgrade
    pub headers: HashMap<String, String>,
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let (path, required) = match path {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (default_config_path(), false),
        };

        let mut builder = Config::builder();
        if let Some(path) = path {
            tracing::debug!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(required));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("WAVEMCP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> CliResult<Self> {
        Ok(config.try_deserialize()?)
    }

    /// Combine these settings with the flags of one command.
    pub fn resolve(&self, conn: &Connection) -> CliResult<(TransportConfig, SessionConfig)> {
        let url = conn
            .url
            .clone()
            .or_else(|| self.url.clone())
            .ok_or_else(|| {
                CliError::InvalidArguments(
                    "no server URL; pass --url or set WAVEMCP_URL".to_string(),
                )
            })?;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(CliError::InvalidArguments(format!(
                "'{url}' is not a WebSocket URL (expected ws:// or wss://)"
            )));
        }

        let timeout = Duration::from_secs(
            conn.timeout
                .or(self.timeout)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        // Header names are case-insensitive; a flag replaces the file's value.
        let mut transport = TransportConfig::websocket(url).with_connect_timeout(timeout);
        let flags = conn.headers.iter().map(|(name, value)| (name, value));
        for (name, value) in self.headers.iter().chain(flags) {
            transport = transport.with_header(name.to_ascii_lowercase(), value);
        }

        let mut session = SessionConfig::default()
            .with_request_timeout(timeout)
            .with_client_info("wavemcp-cli", env!("CARGO_PKG_VERSION"));
        if let Some(version) = &self.protocol_version {
            session = session.with_protocol_version(version.clone());
        }

        Ok((transport, session))
    }
}

/// `<config dir>/wavemcp/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wavemcp").join("config.toml"))
}

//! Relay configuration, loaded from an optional TOML file.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rushget_core::{default_rules, Allowlist, RuleError, RuleSpec};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path existing callers already use.
pub const DEFAULT_ROUTE: &str = "/api/TurboHub";
pub const HEALTH_ROUTE: &str = "/healthz";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid route `{0}`: must be a literal path starting with `/`, other than `/healthz`")]
    Route(String),

    #[error(transparent)]
    Rules(#[from] RuleError),
}

/// Relay settings. Every field is optional in the file.
///
/// Timeouts are in seconds; `0` disables that timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address the relay listens on.
    pub bind: SocketAddr,
    /// Path of the relay endpoint.
    pub route: String,
    /// Time allowed to establish the upstream connection.
    pub connect_timeout_secs: u64,
    /// Longest pause allowed between two upstream body reads.
    pub read_timeout_secs: u64,
    /// Cap on the whole upstream exchange, body included. Off by default so
    /// large artifacts are not cut off.
    pub request_timeout_secs: u64,
    /// Append logs to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Ordered allowlist; a URI is fetched if any rule matches it.
    pub rules: Vec<RuleSpec>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 7071)),
            route: DEFAULT_ROUTE.to_string(),
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
            request_timeout_secs: 0,
            log_file: None,
            rules: default_rules(),
        }
    }
}

impl RelayConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check everything that would otherwise fail after binding, including
    /// routes the router would panic on (`:name`, `*rest`, `{name}`).
    pub fn validate(&self) -> Result<Allowlist, ConfigError> {
        if !self.route.starts_with('/') || self.route == HEALTH_ROUTE || has_placeholder(&self.route) {
            return Err(ConfigError::Route(self.route.clone()));
        }
        Ok(Allowlist::compile(&self.rules)?)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        seconds(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        seconds(self.read_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        seconds(self.request_timeout_secs)
    }
}

fn has_placeholder(route: &str) -> bool {
    route.contains(['{', '}']) || route.split('/').any(|seg| seg.starts_with([':', '*']))
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

//! Command line for the `rushget` binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, RelayConfig};

/// Allowlisted streaming relay for GitHub archives and release assets.
#[derive(Debug, Parser)]
#[command(name = "rushget", version)]
#[command(about = "Allowlisted streaming relay for GitHub archives and release assets", long_about = None)]
pub struct Cli {
    /// TOML config file. Built-in defaults apply when omitted.
    #[arg(long, env = "RUSHGET_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Listen address, overriding the config file.
    #[arg(long, env = "RUSHGET_BIND", value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Listen port, overriding the port of the bind address.
    #[arg(long, env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,
}

impl Cli {
    /// Config file (or defaults) with command line overrides applied.
    pub fn resolve_config(&self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::load(path)?,
            None => RelayConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(port) = self.port {
            config.bind.set_port(port);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn cli(config: Option<PathBuf>, bind: Option<&str>, port: Option<u16>) -> Cli {
        Cli {
            config,
            bind: bind.map(|b| b.parse().unwrap()),
            port,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_means_defaults() {
        let config = cli(None, None, None).resolve_config().unwrap();
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn bind_overrides_default() {
        let config = cli(None, Some("0.0.0.0:9000"), None).resolve_config().unwrap();
        assert_eq!(config.bind.to_string(), "0.0.0.0:9000");
        assert_eq!(config.route, "/api/TurboHub");
    }

    #[test]
    fn port_overrides_bind_port_only() {
        let config = cli(None, Some("0.0.0.0:9000"), Some(9100)).resolve_config().unwrap();
        assert_eq!(config.bind.to_string(), "0.0.0.0:9100");
    }

    #[test]
    fn config_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rushget.toml");
        fs::write(&path, "bind = \"10.0.0.1:8000\"\nroute = \"/dl\"\n").unwrap();

        let config = cli(Some(path), None, Some(8001)).resolve_config().unwrap();
        assert_eq!(config.bind.to_string(), "10.0.0.1:8001");
        assert_eq!(config.route, "/dl");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = cli(Some(dir.path().join("absent.toml")), None, None)
            .resolve_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn flags_parse() {
        let parsed = Cli::try_parse_from(["rushget", "--bind", "127.0.0.1:8080", "--port", "8081"]).unwrap();
        assert_eq!(parsed.bind, Some("127.0.0.1:8080".parse().unwrap()));
        assert_eq!(parsed.port, Some(8081));
    }

    #[test]
    fn rejects_bad_bind_address() {
        let result = Cli::try_parse_from(["rushget", "--bind", "not-an-address"]);
        assert!(result.is_err());
    }
}

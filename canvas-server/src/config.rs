//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

/// Default port for the template server.
pub const DEFAULT_PORT: u16 = 9474;

/// Template storage service for the visual canvas editor
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "canvas-templates")]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(short, long, env = "CANVAS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(short, long, env = "CANVAS_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Directory for template files; in-memory only when unset
    #[arg(short, long, env = "CANVAS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Socket address to listen on.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["canvas-templates"]).expect("parse");

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.addr(), SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_flags() {
        let config = ServerConfig::try_parse_from([
            "canvas-templates",
            "--port",
            "8081",
            "--bind",
            "0.0.0.0",
            "--data-dir",
            "/tmp/templates",
        ])
        .expect("parse");

        assert_eq!(config.addr(), SocketAddr::from(([0, 0, 0, 0], 8081)));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/templates")));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerConfig::try_parse_from(["canvas-templates", "--port", "99999"]).is_err());
    }
}

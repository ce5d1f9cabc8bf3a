//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use embed_http::connection::DEFAULT_MAX_REQUEST_PER_CONNECTION;
use serde::Deserialize;
use thiserror::Error;

/// Settings fixed when the server is built.
///
/// Every field is optional in JSON; missing ones take their default.
///
/// ```json
/// { "address": "0.0.0.0:8080", "web_root": "/srv/www", "max_request_per_connection": 50 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: SocketAddr,
    /// Directory static resources are served from. Must exist when the server starts.
    pub web_root: PathBuf,
    /// Where uploads are staged. Only carried, nothing in the server writes to it.
    pub upload_temp_dir: PathBuf,
    pub max_request_per_connection: usize,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can't read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid config: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },
}

impl ServerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json_str(&json)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let base = base_directory();
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            web_root: base.join("web"),
            upload_temp_dir: base.join("uploads"),
            max_request_per_connection: DEFAULT_MAX_REQUEST_PER_CONNECTION,
        }
    }
}

/// Directory of the running executable, or the working directory if that is unknown.
fn base_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.address, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert!(config.web_root.ends_with("web"));
        assert!(config.upload_temp_dir.ends_with("uploads"));
        assert_eq!(config.max_request_per_connection, 20);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ServerConfig::from_json_str(r#"{ "address": "0.0.0.0:9000", "max_request_per_connection": 5 }"#).unwrap();
        assert_eq!(config.address, SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert_eq!(config.max_request_per_connection, 5);
        assert_eq!(config.web_root, ServerConfig::default().web_root);
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(ServerConfig::from_json_str(r#"{ "address": 12 }"#), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            ServerConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Read { .. })
        ));
    }
}

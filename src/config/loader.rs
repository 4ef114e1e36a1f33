//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{RouteConfig, ServerConfig};

/// Error type for configuration loading. Any of these is fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {} (missing file?): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse routes from {} (malformed JSON?): {source}", path.display())]
    Routes {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse server settings from {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the raw rule records from a JSON route file.
///
/// Records are not validated here; invalid rules are skipped later, one at a
/// time, when the index is built.
pub fn load_routes(path: &Path) -> Result<Vec<RouteConfig>, ConfigError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Routes {
        path: path.to_path_buf(),
        source,
    })
}

/// Load server settings from a TOML file.
pub fn load_server_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = read(path)?;
    toml::from_str(&content).map_err(|source| ConfigError::Settings {
        path: path.to_path_buf(),
        source,
    })
}

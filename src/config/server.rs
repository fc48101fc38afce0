use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_POS_BASE_URL: &str = "https://pos.chulkani.com";
const DB_FILE_NAME: &str = "restaurant.db";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Base URL of the external POS (menus, branches, order confirmation).
    pub pos_base_url: String,
    /// Per-request timeout for outbound POS calls.
    pub pos_timeout: Duration,
    /// Upper bound for a single uploaded image, in bytes.
    pub max_upload_bytes: usize,
}

/// Values read from an optional TOML config file. Every key is optional;
/// missing keys fall back to [`ServerConfig::default`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub pos_base_url: Option<String>,
    pub pos_timeout_secs: Option<u64>,
    pub max_upload_bytes: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

impl ServerConfig {
    /// Layers a config file over the defaults.
    #[must_use]
    pub fn from_file_config(file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            host: file.host.unwrap_or(defaults.host),
            port: file.port.unwrap_or(defaults.port),
            data_dir: file.data_dir.unwrap_or(defaults.data_dir),
            pos_base_url: file
                .pos_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.pos_base_url),
            pos_timeout: file
                .pos_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.pos_timeout),
            max_upload_bytes: file.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
        }
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        Self::db_path_in(&self.data_dir)
    }

    /// Database location inside a data directory.
    #[must_use]
    pub fn db_path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(DB_FILE_NAME)
    }

    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("public").join("uploads")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
            data_dir: PathBuf::from("./data"),
            pos_base_url: DEFAULT_POS_BASE_URL.to_string(),
            pos_timeout: Duration::from_secs(30),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

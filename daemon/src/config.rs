//! Service configuration with TOML file support.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use reunite_utils::LogFormat;
use reunite_verification::WorkflowLimits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where cases are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Durable LMDB environment under `data_dir`.
    Lmdb,
    /// Process memory. Everything is lost on exit.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lmdb" => Ok(Self::Lmdb),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid(format!(
                "unknown storage backend '{other}' (expected 'lmdb' or 'memory')"
            ))),
        }
    }
}

/// Configuration for the Reunite service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin.
    #[serde(default)]
    pub enable_cors: bool,

    #[serde(default = "default_storage")]
    pub storage: StorageBackend,

    /// LMDB environment directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter, e.g. "info" or "info,reunite_verification=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub limits: WorkflowLimits,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    7080
}

fn default_storage() -> StorageBackend {
    StorageBackend::Lmdb
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./reunite_data")
}

fn default_map_size() -> usize {
    reunite_store_lmdb::environment::DEFAULT_MAP_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

/// Values from CLI flags and `REUNITE_*` env vars. Set fields win over the
/// config file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub listen_addr: Option<IpAddr>,
    pub port: Option<u16>,
    pub enable_cors: bool,
    pub storage: Option<StorageBackend>,
    pub data_dir: Option<PathBuf>,
    pub map_size: Option<usize>,
    pub log_format: Option<LogFormat>,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(addr) = overrides.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        self.enable_cors |= overrides.enable_cors;
        if let Some(storage) = overrides.storage {
            self.storage = storage;
        }
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(size) = overrides.map_size {
            self.map_size = size;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage == StorageBackend::Lmdb && self.map_size < 1024 * 1024 {
            return Err(ConfigError::Invalid(format!(
                "map_size {} is too small; LMDB needs at least 1 MiB",
                self.map_size
            )));
        }
        if self.limits.max_chat_append_retries == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_chat_append_retries must be at least 1".into(),
            ));
        }
        if self.limits.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_page_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            enable_cors: false,
            storage: default_storage(),
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            limits: WorkflowLimits::default(),
        }
    }
}

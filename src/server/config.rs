//! Server configuration
//!
//! Loads settings from built-in defaults, an optional `config.toml`, and
//! `LANSHARE_`-prefixed environment variables, in increasing priority.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STORE_ROOT: &str = "uploads";
const DEFAULT_PUBLIC_DIR: &str = "public";

/// Server configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to listen on; all interfaces by default so LAN peers can connect
    pub bind_address: String,
    pub port: u16,
    /// Directory exposed as the store, created at startup if absent
    pub store_root: String,
    /// Static UI assets, served only when the directory exists
    pub public_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            store_root: DEFAULT_STORE_ROOT.to_string(),
            public_dir: DEFAULT_PUBLIC_DIR.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from ./config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name("config").required(false))
    }

    /// Load configuration from an explicit TOML file with environment overrides
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path).required(true))
    }

    fn build<T>(file: T) -> Result<Self, ConfigError>
    where
        T: config::Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("store_root", DEFAULT_STORE_ROOT)?
            .set_default("public_dir", DEFAULT_PUBLIC_DIR)?
            .add_source(file)
            .add_source(Environment::with_prefix("LANSHARE").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.store_root.trim().is_empty() {
            return Err(ConfigError::Message("store_root cannot be empty".into()));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn store_root_path(&self) -> PathBuf {
        PathBuf::from(&self.store_root)
    }

    pub fn public_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.public_dir)
    }
}

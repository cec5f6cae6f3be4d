use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::util::override_u16;

const PORT_ENV: &str = "PANCAKE_PORT";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub baker: BakerConfig,
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        let port_override = env::var(PORT_ENV).ok();
        Self::load_from(&resolve_config_path(), port_override.as_deref())
    }

    pub fn load_from(config_path: &Path, port_override: Option<&str>) -> Result<Self> {
        let mut config = if config_path.exists() {
            let raw = fs::read_to_string(config_path)
                .with_context(|| format!("failed to read config file {}", config_path.display()))?;
            Self::from_toml_str(&raw)
                .with_context(|| format!("failed to parse TOML from {}", config_path.display()))?
        } else {
            DaemonConfig::default()
        };

        config.server.port = override_u16(PORT_ENV, port_override, config.server.port);
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("PANCAKE_CONFIG") {
        return Path::new(&path).to_path_buf();
    }

    if let Some(base) = dirs::config_dir() {
        return base.join("pancake").join("config.toml");
    }

    Path::new("/tmp/pancake.toml").to_path_buf()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    // Connections silent for longer than this are dropped; 0 keeps them forever.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    50051
}

fn default_idle_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BakerConfig {
    // Fixed seed for the technical score generator; seeded from the clock when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

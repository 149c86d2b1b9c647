//! Configuration system for the rendezvous daemon.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $RENDEZVOUS_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/rendezvous/config.toml
//!   3. ~/.config/rendezvous/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendezvousConfig {
    pub network: NetworkConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the HTTP API binds to. "::" accepts both families on most hosts.
    pub listen_addr: String,
    /// TCP port for the HTTP API.
    pub api_port: u16,
    /// Take the caller address from this header instead of the socket peer.
    /// Only set this behind a reverse proxy that overwrites the header.
    pub forwarded_header: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// TTL assigned on every registration.
    pub initial_ttl: u8,
    /// Seconds between decay sweeps; also the amount each sweep subtracts.
    pub expire_period: u8,
    /// Port recorded when a peer registers without declaring one.
    pub default_port: u16,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: "::".to_string(),
            api_port: 8080,
            forwarded_header: None,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_ttl: 60,
            expire_period: 10,
            default_port: 443,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("rendezvous")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl RendezvousConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            Self::from_toml(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            RendezvousConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("RENDEZVOUS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&RendezvousConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Reject settings the registry cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.initial_ttl == 0 {
            return Err(ConfigError::Invalid(
                "registry.initial_ttl",
                "must be at least 1".to_string(),
            ));
        }
        if self.registry.expire_period == 0 {
            return Err(ConfigError::Invalid(
                "registry.expire_period",
                "must be at least 1".to_string(),
            ));
        }
        if let Some(header) = &self.network.forwarded_header {
            if header.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "network.forwarded_header",
                    "must not be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply RENDEZVOUS_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("RENDEZVOUS_NETWORK__LISTEN_ADDR") {
            self.network.listen_addr = v;
        }
        if let Some(v) = lookup("RENDEZVOUS_NETWORK__API_PORT") {
            if let Ok(p) = v.parse() {
                self.network.api_port = p;
            }
        }
        if let Some(v) = lookup("RENDEZVOUS_NETWORK__FORWARDED_HEADER") {
            self.network.forwarded_header = if v.is_empty() { None } else { Some(v) };
        }
        if let Some(v) = lookup("RENDEZVOUS_REGISTRY__INITIAL_TTL") {
            if let Ok(t) = v.parse() {
                self.registry.initial_ttl = t;
            }
        }
        if let Some(v) = lookup("RENDEZVOUS_REGISTRY__EXPIRE_PERIOD") {
            if let Ok(t) = v.parse() {
                self.registry.expire_period = t;
            }
        }
        if let Some(v) = lookup("RENDEZVOUS_REGISTRY__DEFAULT_PORT") {
            if let Ok(p) = v.parse() {
                self.registry.default_port = p;
            }
        }
    }
}

//! # Config
//!
//! This file is part of the SMB Opener project.
//!
//! Runtime configuration for the listener, locator parsing, mounting and
//! logging. Defaults reproduce the stock behavior: listen on
//! `127.0.0.1:5555`, accept `smb://` locators, mount under `/Volumes`.
//!
//! Configuration can be loaded from a TOML file, from environment
//! variables, or built programmatically with [`OpenerConfig::default_with_overrides`].
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

use crate::error::{OpenerError, Result};

/// Default loopback address the daemon listens on
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:5555";

/// Pending connection queue length
pub const DEFAULT_BACKLOG: u32 = 1;

/// Max accepted locator length in bytes
pub const MAX_LINE_BYTES: usize = 2048;

/// Locator scheme accepted by the dispatcher
pub const DEFAULT_SCHEME: &str = "smb";

/// Directory under which shares appear once mounted
pub const DEFAULT_MOUNT_ROOT: &str = "/Volumes";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "SMB_OPENER";

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OpenerConfig {
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub mount: MountConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address to bind, normally a loopback address
    pub address: String,
    pub backlog: u32,
    /// Longest locator accepted; longer input is rejected, not truncated
    pub max_line_bytes: usize,
    /// How long to wait for the peer to send its line (milliseconds in TOML)
    #[serde(with = "duration_ms")]
    pub read_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            backlog: DEFAULT_BACKLOG,
            max_line_bytes: MAX_LINE_BYTES,
            read_timeout: crate::utils::timeout::DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub scheme: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    pub root: PathBuf,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_MOUNT_ROOT),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub app_name: String,
    #[serde(with = "level_str")]
    pub log_level: Level,
    pub log_to_console: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: "smb_opener".to_string(),
            log_level: Level::INFO,
            log_to_console: true,
            log_dir: None,
            json_format: false,
        }
    }
}

impl OpenerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw).map_err(|e| {
            OpenerError::Config(format!("{}: {e}", path.as_ref().display()))
        })
    }

    /// Defaults with environment variable overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Start from defaults and let the caller tweak fields
    pub fn default_with_overrides<F>(f: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        f(&mut config);
        config
    }

    /// Write configuration back out as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let raw = toml::to_string_pretty(self)
            .map_err(|e| OpenerError::Config(e.to_string()))?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Apply `SMB_OPENER_*` overrides on top of the current values
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(address) = env_var("ADDRESS") {
            self.listener.address = address;
        }
        if let Some(raw) = env_var("MAX_LINE_BYTES") {
            self.listener.max_line_bytes = parse_env("MAX_LINE_BYTES", &raw)?;
        }
        if let Some(raw) = env_var("READ_TIMEOUT_MS") {
            let ms: u64 = parse_env("READ_TIMEOUT_MS", &raw)?;
            self.listener.read_timeout = Duration::from_millis(ms);
        }
        if let Some(scheme) = env_var("SCHEME") {
            self.locator.scheme = scheme;
        }
        if let Some(root) = env_var("MOUNT_ROOT") {
            self.mount.root = PathBuf::from(root);
        }
        if let Some(raw) = env_var("LOG_LEVEL") {
            self.logging.log_level = parse_env("LOG_LEVEL", &raw)?;
        }
        Ok(())
    }

    /// Reject values the daemon cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.locator.scheme.is_empty() {
            return Err(OpenerError::Config("locator scheme must not be empty".into()));
        }
        if self.listener.max_line_bytes == 0 {
            return Err(OpenerError::Config("max_line_bytes must be positive".into()));
        }
        if self.listener.backlog == 0 {
            return Err(OpenerError::Config("backlog must be positive".into()));
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        OpenerError::Config(format!("invalid value for {ENV_PREFIX}_{key}: {raw:?}"))
    })
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod level_str {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub fn serialize<S: Serializer>(value: &Level, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.as_str().to_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Level, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(D::Error::custom)
    }
}

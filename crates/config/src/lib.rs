#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for nbs
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/nbs/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;
pub mod plan;

pub use plan::BuildPlan;

use nbs_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use constants::{APP_DIR, CONFIG_FILE, DEFAULT_CHUNK_SIZE, DEFAULT_PPA_BASE, DEFAULT_USER_AGENT};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub paths: PathConfig,

    /// Extra or replacement mirror lists keyed by distro name
    #[serde(default)]
    pub mirrors: BTreeMap<String, Vec<String>>,
}

/// General configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Suppress per-package diagnostics and the selection report
    #[serde(default)]
    pub quiet: bool,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Metadata probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_jitter_min_ms")]
    pub jitter_min_ms: u64,
    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,
    /// Mirrors probed per (descriptor, component) pair; 0 probes every mirror
    #[serde(default = "default_mirrors_per_component")]
    pub mirrors_per_component: usize,
    #[serde(default = "default_ppa_base")]
    pub ppa_base: String,
}

/// Artifact download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Full passes over the candidate list before giving up
    #[serde(default = "default_passes")]
    pub passes: u8,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub cache_dir: Option<PathBuf>,
}

// Default implementations

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            retries: default_retries(),
            jitter_min_ms: default_jitter_min_ms(),
            jitter_max_ms: default_jitter_max_ms(),
            mirrors_per_component: default_mirrors_per_component(),
            ppa_base: default_ppa_base(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            passes: default_passes(),
            chunk_size: default_chunk_size(),
        }
    }
}

// Default value functions for serde
fn default_timeout() -> u64 {
    20
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_workers() -> usize {
    5
}

fn default_retries() -> u32 {
    3
}

fn default_jitter_min_ms() -> u64 {
    200
}

fn default_jitter_max_ms() -> u64 {
    600
}

fn default_mirrors_per_component() -> usize {
    1
}

fn default_ppa_base() -> String {
    DEFAULT_PPA_BASE.to_string()
}

fn default_passes() -> u8 {
    2
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl ProbeConfig {
    /// Jitter window between metadata attempts, normalised so min <= max
    #[must_use]
    pub fn jitter(&self) -> (Duration, Duration) {
        let low = self.jitter_min_ms.min(self.jitter_max_ms);
        let high = self.jitter_min_ms.max(self.jitter_max_ms);
        (Duration::from_millis(low), Duration::from_millis(high))
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// If path is provided, loads from that file.
    /// If path is None, uses the default loading behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Reject values the engine cannot run with
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for zero workers, retries, passes
    /// or chunk size.
    pub fn validate(&self) -> Result<(), Error> {
        let checks = [
            ("probe.workers", self.probe.workers == 0, self.probe.workers.to_string()),
            ("probe.retries", self.probe.retries == 0, self.probe.retries.to_string()),
            ("download.passes", self.download.passes == 0, self.download.passes.to_string()),
            (
                "download.chunk_size",
                self.download.chunk_size == 0,
                self.download.chunk_size.to_string(),
            ),
        ];
        for (field, invalid, value) in checks {
            if invalid {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // NBS_QUIET
        if let Ok(quiet) = std::env::var("NBS_QUIET") {
            self.general.quiet = parse_bool("NBS_QUIET", quiet)?;
        }

        // NBS_TIMEOUT
        if let Ok(timeout) = std::env::var("NBS_TIMEOUT") {
            let secs = parse_number("NBS_TIMEOUT", timeout)?;
            self.network.timeout = secs;
            self.network.connect_timeout = secs;
        }

        // NBS_PROBE_WORKERS
        if let Ok(workers) = std::env::var("NBS_PROBE_WORKERS") {
            self.probe.workers = parse_number("NBS_PROBE_WORKERS", workers)?;
        }

        // NBS_PROBE_RETRIES
        if let Ok(retries) = std::env::var("NBS_PROBE_RETRIES") {
            self.probe.retries = parse_number("NBS_PROBE_RETRIES", retries)?;
        }

        // NBS_MIRRORS_PER_COMPONENT
        if let Ok(fanout) = std::env::var("NBS_MIRRORS_PER_COMPONENT") {
            self.probe.mirrors_per_component = parse_number("NBS_MIRRORS_PER_COMPONENT", fanout)?;
        }

        // NBS_PPA_BASE
        if let Ok(base) = std::env::var("NBS_PPA_BASE") {
            if base.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "NBS_PPA_BASE".to_string(),
                    value: base,
                }
                .into());
            }
            self.probe.ppa_base = base;
        }

        // NBS_CACHE_DIR
        if let Ok(dir) = std::env::var("NBS_CACHE_DIR") {
            self.paths.cache_dir = Some(PathBuf::from(dir));
        }

        self.validate()
    }

    /// Get the cache root (with default)
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.paths.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join(APP_DIR)
        })
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: String) -> Result<T, Error> {
    value.parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()
    })
}

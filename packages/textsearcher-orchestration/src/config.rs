//! Pipeline configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults ([`PipelineConfig::default`])
//! 2. YAML file (`version: 1` schema)
//! 3. `TEXTSEARCHER_*` environment variables
//! 4. Builder calls / CLI flags
//!
//! ```yaml
//! version: 1
//! chunk_size: 1000
//! concurrency: 8
//! deadline_ms: 30000
//! shutdown_grace_ms: 60000
//! match_mode: substring
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use textsearcher_core::MatchMode;
use thiserror::Error;

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 60_000;
pub const MAX_CHUNK_SIZE: usize = 1_000_000;
pub const MAX_CONCURRENCY: usize = 1024;

pub const ENV_CHUNK_SIZE: &str = "TEXTSEARCHER_CHUNK_SIZE";
pub const ENV_CONCURRENCY: &str = "TEXTSEARCHER_CONCURRENCY";
pub const ENV_DEADLINE_MS: &str = "TEXTSEARCHER_DEADLINE_MS";
pub const ENV_MATCH_MODE: &str = "TEXTSEARCHER_MATCH_MODE";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Range validation error
    #[error("Invalid range for field '{field}': {value} not in {min}..={max}. {hint}")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    #[error("Missing 'version' field in configuration file. Add 'version: 1' to the top of your YAML file.")]
    MissingVersion,

    #[error("Unsupported configuration version {found}. Supported versions: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("{0}")]
    UnknownMatchMode(String),

    /// Environment override could not be parsed
    #[error("Invalid value '{value}' for {var}: {reason}")]
    Env {
        var: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create a range error with a hint
    pub fn range_with_hint(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }
}

/// Tuning knobs for the chunked scan pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub version: u32,

    /// Lines per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Worker pool size
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-invocation deadline; `None` waits indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,

    /// How long pool shutdown waits for in-flight tasks
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,

    #[serde(default)]
    pub match_mode: MatchMode,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_concurrency() -> usize {
    num_cpus::get().clamp(1, MAX_CONCURRENCY)
}

fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_MS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            chunk_size: default_chunk_size(),
            concurrency: default_concurrency(),
            deadline_ms: None,
            shutdown_grace_ms: default_shutdown_grace_ms(),
            match_mode: MatchMode::default(),
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: CONFIG_VERSION,
            });
        }

        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::range_with_hint(
                "chunk_size",
                self.chunk_size,
                1,
                MAX_CHUNK_SIZE,
                "A chunk must hold at least one line",
            ));
        }

        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::range_with_hint(
                "concurrency",
                self.concurrency,
                1,
                MAX_CONCURRENCY,
                "The worker pool needs at least one thread",
            ));
        }

        if self.deadline_ms == Some(0) {
            return Err(ConfigError::range_with_hint(
                "deadline_ms",
                0,
                1,
                u64::MAX,
                "Omit deadline_ms to wait without a deadline",
            ));
        }

        Ok(())
    }

    /// Load from YAML file (v1 schema)
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        let found = raw
            .get("version")
            .and_then(serde_yaml::Value::as_u64)
            .ok_or(ConfigError::MissingVersion)?;
        if found != u64::from(CONFIG_VERSION) {
            return Err(ConfigError::UnsupportedVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                supported: CONFIG_VERSION,
            });
        }

        let config: Self = serde_yaml::from_value(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply `TEXTSEARCHER_*` variables from the process environment
    pub fn apply_env_overrides(self) -> ConfigResult<Self> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CHUNK_SIZE) {
            self.chunk_size = parse_env(ENV_CHUNK_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_CONCURRENCY) {
            self.concurrency = parse_env(ENV_CONCURRENCY, &value)?;
        }
        if let Some(value) = lookup(ENV_DEADLINE_MS) {
            self.deadline_ms = Some(parse_env(ENV_DEADLINE_MS, &value)?);
        }
        if let Some(value) = lookup(ENV_MATCH_MODE) {
            self.match_mode = MatchMode::from_str(&value).map_err(|reason| ConfigError::Env {
                var: ENV_MATCH_MODE.to_string(),
                value: value.clone(),
                reason,
            })?;
        }

        self.validate()?;
        Ok(self)
    }
}

fn parse_env<T>(var: &str, value: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var: var.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Builder for [`PipelineConfig`]
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline_ms = Some(deadline.as_millis() as u64);
        self
    }

    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace_ms = grace.as_millis() as u64;
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.config.match_mode = mode;
        self
    }

    pub fn build(self) -> ConfigResult<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

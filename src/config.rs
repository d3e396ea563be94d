use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub producers: ProducerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Number of most-recent values retained in the window. Must be > 0.
    pub capacity: usize,
    /// How many values `numbers` and `average` look at.
    pub latest_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProducerConfig {
    /// Random-number producer threads. 0 = no built-in feed.
    pub threads: usize,
    /// Pause between values, per thread, in milliseconds
    pub pause_ms: u64,
    /// Inclusive lower bound of generated values
    pub min: i64,
    /// Inclusive upper bound of generated values
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// tracing EnvFilter directive, e.g. "info" or "numring=debug". RUST_LOG wins.
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("store.capacity must be greater than zero")]
    ZeroCapacity,
    #[error("store.latest_limit must be greater than zero")]
    ZeroLatestLimit,
    #[error("producers.min ({min}) is greater than producers.max ({max})")]
    EmptyRange { min: i64, max: i64 },
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for StoreConfig {
    fn default() -> Self {
        Self { capacity: 1000, latest_limit: 100 }
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self { threads: 4, pause_ms: 1000, min: 1, max: 10_000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".into() }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    /// Defaults when no config file exists yet (and a commented copy is
    /// written for next time). An existing file that cannot be read or
    /// parsed is an error.
    pub fn load() -> Result<Self> {
        match Config::config_path() {
            Some(path) => Config::load_from(&path),
            None       => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Best-effort first run
            let _ = try_write_defaults(path);
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Config::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("numring").join("numring.toml"))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reject settings that would yield an unusable store or producer pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.store.latest_limit == 0 {
            return Err(ConfigError::ZeroLatestLimit);
        }
        if self.producers.min > self.producers.max {
            return Err(ConfigError::EmptyRange { min: self.producers.min, max: self.producers.max });
        }
        Ok(())
    }
}

fn try_write_defaults(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# numring configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}

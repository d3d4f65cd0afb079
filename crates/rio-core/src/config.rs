//! console.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trailing-edge delay before a buffered scale change is written.
pub const DEFAULT_SCALE_DEBOUNCE_MS: u64 = 500;

/// Default on-disk resource file used by `rioctl`.
pub const DEFAULT_STORE_PATH: &str = "services.json";

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConsoleConfig {
    pub scale: Option<ScaleConfig>,
    pub store: Option<StoreConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub filter: Option<String>,
}

impl ConsoleConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConsoleConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Debounce window for scale writes.
    pub fn scale_debounce(&self) -> Duration {
        let ms = self
            .scale
            .as_ref()
            .and_then(|s| s.debounce_ms)
            .unwrap_or(DEFAULT_SCALE_DEBOUNCE_MS);
        Duration::from_millis(ms)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .as_ref()
            .and_then(|s| s.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    pub fn log_filter(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|l| l.filter.as_deref())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }
}

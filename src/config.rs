//! Feed configuration and application paths.
//!
//! Config directory priority:
//! 1. CLI `--config-dir`
//! 2. `REELFEED_CONFIG_DIR` environment variable
//! 3. Current directory IF any reelfeed files exist there
//! 4. Platform directory from dirs-next (`~/.config/reelfeed`, ...)

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::entities::WindowPolicy;

/// Default config file name
pub const CONFIG_FILE: &str = "reelfeed.json";
/// Default warm-start cache file name
pub const CACHE_FILE: &str = "reelfeed_cache.json";
/// Default log file name
pub const LOG_FILE: &str = "reelfeed.log";

const APP_DIR: &str = "reelfeed";
const ENV_CONFIG_DIR: &str = "REELFEED_CONFIG_DIR";

/// Overrides for the default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args -> ENV var -> None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(ENV_CONFIG_DIR).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path to a configuration file
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir).join(name)
}

/// Path to a data file (warm-start cache, logs)
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir).join(name)
}

/// Create config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir);
    let data_dir = resolve_dir(config, dirs_next::data_dir);

    for dir in [&config_dir, &data_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    [CONFIG_FILE, CACHE_FILE, LOG_FILE]
        .iter()
        .any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform: fn() -> Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_files(&current_dir) {
            return current_dir;
        }
    }

    if let Some(dir) = platform() {
        return dir.join(APP_DIR);
    }

    PathBuf::from(".")
}

/// Runtime configuration of the feed core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Items requested per page
    pub page_size: u32,
    pub window: WindowPolicy,
    /// Background worker threads (0 = run fetches and opens inline)
    pub workers: usize,
    /// Playback rate while hold-to-speed-up is active
    pub hold_speed: f32,
    /// Warm-start cache file; `None` disables warm start
    pub cache_file: Option<PathBuf>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            window: WindowPolicy::default(),
            workers: (num_cpus::get() * 3 / 4).max(1),
            hold_speed: 2.0,
            cache_file: None,
        }
    }
}

impl FeedConfig {
    /// Load from a JSON file. Missing keys take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: FeedConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be positive");
        }
        if !(self.hold_speed.is_finite() && self.hold_speed > 0.0) {
            anyhow::bail!("hold_speed must be a positive number, got {}", self.hold_speed);
        }
        self.window.validate().map_err(anyhow::Error::msg)
    }
}

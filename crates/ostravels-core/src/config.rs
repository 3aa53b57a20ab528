use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::conversation::{Pacing, DEFAULT_GREETING_DELAY, DEFAULT_REPLY_DELAY};

/// Environment variable that points at a replacement visa dataset
pub const DATASET_ENV: &str = "OSTRAVELS_DATASET";

/// Longest typing delay honoured from the config file
pub const MAX_DELAY: Duration = Duration::from_secs(60);

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config written on first run, so the knobs are visible in the file
    pub fn with_defaults() -> Self {
        Self {
            greeting_delay_ms: Some(DEFAULT_GREETING_DELAY.as_millis() as u64),
            reply_delay_ms: Some(DEFAULT_REPLY_DELAY.as_millis() as u64),
            dataset_path: None,
            log_level: Some("info".to_string()),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_or_create(&Self::get_config_path()?)
    }

    /// Like [`Config::load_from`], but writes the defaults when the file is missing.
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load_from(config_path);
        }

        let config = Self::with_defaults();
        config.save_to(config_path)?;
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Typing delays, falling back to the defaults for unset values.
    /// Values above [`MAX_DELAY`] are clamped.
    pub fn pacing(&self) -> Pacing {
        let defaults = Pacing::default();
        let delay = |ms: Option<u64>, fallback: Duration| {
            ms.map(Duration::from_millis)
                .unwrap_or(fallback)
                .min(MAX_DELAY)
        };
        Pacing {
            greeting_delay: delay(self.greeting_delay_ms, defaults.greeting_delay),
            reply_delay: delay(self.reply_delay_ms, defaults.reply_delay),
        }
    }

    /// Dataset override: `flag` (from the command line) first, then the
    /// environment, then the config file.
    pub fn dataset_path(&self, flag: Option<&Path>) -> Option<PathBuf> {
        choose_dataset(flag, std::env::var(DATASET_ENV).ok(), self.dataset_path.as_deref())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ostravels"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

fn choose_dataset(
    flag: Option<&Path>,
    env: Option<String>,
    configured: Option<&str>,
) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }

    env.filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| configured.map(PathBuf::from))
}

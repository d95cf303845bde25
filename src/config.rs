use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "coursewatch.toml";
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub canvas: Option<CanvasConfig>,
    #[serde(default)]
    pub discord: Option<DiscordConfig>,
    #[serde(default)]
    pub poll: Option<PollConfig>,
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CanvasConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub course_id: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_pages: Option<usize>,
    pub max_attempts: Option<usize>,
    pub base_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
}

impl CanvasConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(30).max(1))
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages.unwrap_or(100).max(1)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts.unwrap_or(3).max(1)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms.unwrap_or(500))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms.unwrap_or(10_000))
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DiscordConfig {
    pub token: Option<String>,
    pub channel_id: Option<u64>,
    pub api_base: Option<String>,
}

impl DiscordConfig {
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_DISCORD_API_BASE)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PollConfig {
    pub interval_secs: Option<u64>,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.unwrap_or(300).max(1))
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StoreConfig {
    pub path: Option<String>,
}

impl StoreConfig {
    pub fn path(&self) -> String {
        if let Some(path) = &self.path {
            return path.clone();
        }
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("coursewatch")
            .join("coursewatch.db")
            .to_string_lossy()
            .to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl Config {
    /// Reads the TOML file if it exists. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_toml(&raw).map_err(|err| match err {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_toml(raw: &str) -> ConfigResult<Self> {
        toml::from_str(raw).map_err(|err| ConfigError::Parse {
            path: "<inline>".to_string(),
            reason: err.to_string(),
        })
    }

    /// Loads `.env`, the config file, then applies process environment overrides.
    pub fn load() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var("COURSEWATCH_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let canvas = self.canvas.get_or_insert_with(CanvasConfig::default);
        if let Some(value) = lookup("CANVAS_URL") {
            canvas.base_url = Some(value);
        }
        if let Some(value) = lookup("CANVAS_TOKEN") {
            canvas.token = Some(value);
        }
        if let Some(value) = lookup("CANVAS_COURSE_ID") {
            canvas.course_id = Some(parse_id("CANVAS_COURSE_ID", &value)?);
        }

        let discord = self.discord.get_or_insert_with(DiscordConfig::default);
        if let Some(value) = lookup("DISCORD_TOKEN") {
            discord.token = Some(value);
        }
        if let Some(value) = lookup("DISCORD_CHANNEL_ID") {
            discord.channel_id = Some(parse_id("DISCORD_CHANNEL_ID", &value)?);
        }

        if let Some(value) = lookup("COURSEWATCH_DB_PATH") {
            self.store.get_or_insert_with(StoreConfig::default).path = Some(value);
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let mut missing = Vec::new();
        let canvas = self.canvas.clone().unwrap_or_default();
        let discord = self.discord.clone().unwrap_or_default();
        if is_blank(canvas.base_url.as_deref()) {
            missing.push("CANVAS_URL".to_string());
        }
        if is_blank(canvas.token.as_deref()) {
            missing.push("CANVAS_TOKEN".to_string());
        }
        if canvas.course_id.is_none() {
            missing.push("CANVAS_COURSE_ID".to_string());
        }
        if is_blank(discord.token.as_deref()) {
            missing.push("DISCORD_TOKEN".to_string());
        }
        if discord.channel_id.is_none() {
            missing.push("DISCORD_CHANNEL_ID".to_string());
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        if let Some(base_url) = canvas.base_url.as_deref() {
            url::Url::parse(base_url).map_err(|err| ConfigError::Invalid {
                key: "CANVAS_URL".to_string(),
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn canvas(&self) -> CanvasConfig {
        self.canvas.clone().unwrap_or_default()
    }

    pub fn discord(&self) -> DiscordConfig {
        self.discord.clone().unwrap_or_default()
    }

    pub fn poll(&self) -> PollConfig {
        self.poll.clone().unwrap_or_default()
    }

    pub fn store(&self) -> StoreConfig {
        self.store.clone().unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|logging| logging.level.as_deref())
            .unwrap_or("info")
    }
}

fn parse_id(key: &str, value: &str) -> ConfigResult<u64> {
    value.trim().parse::<u64>().map_err(|err| ConfigError::Invalid {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|value| value.trim().is_empty()).unwrap_or(true)
}

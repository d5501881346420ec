use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, info};
use serde::{Deserialize, Serialize};

use crate::providers::openai_compat::DEFAULT_TIMEOUT_SECS;
use crate::translation::batch::DEFAULT_CONCURRENT_REQUESTS;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Document store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Translation pipeline settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Result announcement settings
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Per-platform scheduling cadence
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Document store settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Database file path; the platform data directory is used when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Credentials and model identity for one tier's completion endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelTierConfig {
    /// Model name to request
    #[serde(default = "default_model")]
    pub model: String,

    /// API key
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Base endpoint URL of the OpenAI-compatible service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for ModelTierConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            endpoint: default_endpoint(),
        }
    }
}

/// Translation pipeline settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Primary ("upgrade") model tier
    #[serde(default)]
    pub primary: ModelTierConfig,

    /// Secondary ("downgrade") model tier; absence disables fallback
    #[serde(default)]
    pub secondary: Option<ModelTierConfig>,

    /// Whether primary-tier failures are retried at the secondary tier
    #[serde(default)]
    pub enable_fallback: bool,

    /// Sampling temperature for both tiers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Language the summaries are translated into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Items per change-set page
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum concurrent in-flight translation requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Completion request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            primary: ModelTierConfig::default(),
            secondary: None,
            enable_fallback: false,
            temperature: default_temperature(),
            target_language: default_target_language(),
            batch_size: default_batch_size(),
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Result announcement settings (Telegram bot API)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Whether to announce completed drain cycles
    #[serde(default)]
    pub enable: bool,

    /// Bot API base URL, the token is appended directly
    #[serde(default = "default_bot_api")]
    pub bot_api: String,

    /// Bot token
    #[serde(default = "String::new")]
    pub bot_token: String,

    /// Chat to deliver to
    #[serde(default = "String::new")]
    pub chat_id: String,

    /// Delivery attempts before giving up
    #[serde(default = "default_notify_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between delivery attempts, in seconds
    #[serde(default = "default_notify_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enable: false,
            bot_api: default_bot_api(),
            bot_token: String::new(),
            chat_id: String::new(),
            retry_attempts: default_notify_attempts(),
            retry_delay_secs: default_notify_delay_secs(),
        }
    }
}

/// Recurring trigger for one platform: a fixed interval, or cron-style fields
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Cadence {
    /// Fire every this many seconds; ignored when cron fields are set
    #[serde(default)]
    pub interval_secs: Option<u64>,

    /// Cron-style recurring trigger
    #[serde(default)]
    pub cron: Option<CronFields>,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            interval_secs: Some(default_interval_secs()),
            cron: None,
        }
    }
}

/// Cron-style trigger fields; unset fields widen the recurrence
/// (only `minute` set fires hourly at that minute, `hour` + `minute` daily,
/// and so on)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CronFields {
    /// Day of month (1-31)
    #[serde(default)]
    pub day: Option<u32>,
    /// Hour (0-23)
    #[serde(default)]
    pub hour: Option<u32>,
    /// Minute (0-59)
    #[serde(default)]
    pub minute: Option<u32>,
    /// Second (0-59)
    #[serde(default)]
    pub second: Option<u32>,
}

/// Per-platform scheduling cadence
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ScheduleConfig {
    /// CurseForge drain cycle cadence
    #[serde(default)]
    pub curseforge: Cadence,

    /// Modrinth drain cycle cadence
    #[serde(default)]
    pub modrinth: Cadence,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    "deepseek-v3".to_string()
}

fn default_endpoint() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_target_language() -> String {
    "Chinese".to_string()
}

fn default_batch_size() -> usize {
    16
}

fn default_concurrent_requests() -> usize {
    DEFAULT_CONCURRENT_REQUESTS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_bot_api() -> String {
    "https://api.telegram.org/bot".to_string()
}

fn default_notify_attempts() -> u32 {
    10
}

fn default_notify_delay_secs() -> u64 {
    1
}

fn default_interval_secs() -> u64 {
    3600 * 24
}

impl Config {
    /// Load the configuration from a file, creating it with defaults first
    /// when it does not exist (so operators get a template to fill in).
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {:?} not found, writing defaults", path);
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Persist the configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values.
    ///
    /// Failures here are fatal: the scheduler must not start in a
    /// half-configured state.
    pub fn validate(&self) -> Result<()> {
        if self.translation.primary.api_key.is_empty() {
            return Err(anyhow!("Primary tier API key is required"));
        }
        if self.translation.primary.model.is_empty() {
            return Err(anyhow!("Primary tier model name is required"));
        }

        if self.translation.enable_fallback {
            let secondary = self
                .translation
                .secondary
                .as_ref()
                .ok_or_else(|| anyhow!("Fallback is enabled but no secondary tier is configured"))?;
            if secondary.api_key.is_empty() {
                return Err(anyhow!("Secondary tier API key is required when fallback is enabled"));
            }
            if secondary.model.is_empty() {
                return Err(anyhow!("Secondary tier model name is required when fallback is enabled"));
            }
        }

        if self.translation.batch_size == 0 {
            return Err(anyhow!("batch_size must be at least 1"));
        }
        if self.translation.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }
        if self.translation.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be at least 1"));
        }

        if self.notification.enable {
            if self.notification.bot_token.is_empty() {
                return Err(anyhow!("Notification bot token is required when notifications are enabled"));
            }
            if self.notification.chat_id.is_empty() {
                return Err(anyhow!("Notification chat id is required when notifications are enabled"));
            }
        }

        for (name, cadence) in [
            ("curseforge", &self.schedule.curseforge),
            ("modrinth", &self.schedule.modrinth),
        ] {
            cadence
                .validate()
                .with_context(|| format!("Invalid {} schedule", name))?;
        }

        Ok(())
    }
}

impl Cadence {
    /// Check that the cadence describes a usable trigger
    pub fn validate(&self) -> Result<()> {
        if let Some(cron) = &self.cron {
            if cron.day.is_none()
                && cron.hour.is_none()
                && cron.minute.is_none()
                && cron.second.is_none()
            {
                return Err(anyhow!("Cron trigger has no fields set"));
            }
            if let Some(day) = cron.day {
                if !(1..=31).contains(&day) {
                    return Err(anyhow!("Cron day must be in 1-31, got {}", day));
                }
            }
            if let Some(hour) = cron.hour {
                if hour > 23 {
                    return Err(anyhow!("Cron hour must be in 0-23, got {}", hour));
                }
            }
            if let Some(minute) = cron.minute {
                if minute > 59 {
                    return Err(anyhow!("Cron minute must be in 0-59, got {}", minute));
                }
            }
            if let Some(second) = cron.second {
                if second > 59 {
                    return Err(anyhow!("Cron second must be in 0-59, got {}", second));
                }
            }
            return Ok(());
        }

        match self.interval_secs {
            Some(0) => Err(anyhow!("Interval must be at least 1 second")),
            Some(_) => Ok(()),
            None => Err(anyhow!("Either interval_secs or cron must be set")),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            store: StoreConfig::default(),
            translation: TranslationConfig::default(),
            notification: NotificationConfig::default(),
            schedule: ScheduleConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

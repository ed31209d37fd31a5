use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use teloxide::types::ChatId;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

/// Chat IDs are kept as raw strings and parsed on use, so a bad value only
/// disables the check or notification that needs it.
#[derive(Debug, Deserialize, Clone)]
pub struct PresenceConfig {
    #[serde(default)]
    pub target_chat_id: Option<String>,
    #[serde(default)]
    pub notification_user_id: Option<String>,
    /// Minimum gap between two presence checks
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
    /// Period of the background timer that ticks the presence check
    #[serde(default = "default_timer_secs")]
    pub timer_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            target_chat_id: None,
            notification_user_id: None,
            min_interval_secs: default_min_interval_secs(),
            timer_secs: default_timer_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
        }
    }
}

fn default_min_interval_secs() -> u64 {
    60
}

fn default_timer_secs() -> u64 {
    20
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".")
}

impl PresenceConfig {
    pub fn target_chat_id(&self) -> Result<ChatId> {
        parse_id(self.target_chat_id.as_deref(), "TARGET_CHAT_ID").map(ChatId)
    }

    /// Private chats with a user share the user's numeric ID.
    pub fn notification_chat_id(&self) -> Result<ChatId> {
        parse_id(self.notification_user_id.as_deref(), "NOTIFICATION_USER_ID").map(ChatId)
    }
}

fn parse_id(raw: Option<&str>, name: &str) -> Result<i64> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        bail!("{} is not set", name);
    }
    raw.parse::<i64>()
        .with_context(|| format!("Failed to parse {} '{}'", name, raw))
}

/// Parse a user-supplied chat ID such as `-1001234567890`.
pub fn parse_chat_id(raw: &str) -> Option<ChatId> {
    raw.trim().parse::<i64>().ok().map(ChatId)
}

impl Config {
    /// Load configuration from an optional TOML file, then apply overrides
    /// from the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let content = if path.exists() {
            Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?,
            )
        } else {
            None
        };

        Self::from_sources(content.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build a config from TOML text (if any) and an environment lookup.
    /// Environment values win over the file.
    pub fn from_sources<F>(content: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Config = match content {
            Some(text) => toml::from_str(text).context("Failed to parse config file")?,
            None => Config::default(),
        };

        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            config.telegram.bot_token = token;
        }
        if let Some(id) = lookup("TARGET_CHAT_ID") {
            config.presence.target_chat_id = Some(id);
        }
        if let Some(id) = lookup("NOTIFICATION_USER_ID") {
            config.presence.notification_user_id = Some(id);
        }
        if let Some(dir) = lookup("MESSAGE_LOG_DIR") {
            config.storage.log_directory = PathBuf::from(dir);
        }

        if config.telegram.bot_token.trim().is_empty() {
            bail!("TELEGRAM_BOT_TOKEN environment variable is not set");
        }
        if config.presence.min_interval_secs == 0 {
            bail!("presence.min_interval_secs must be greater than zero");
        }
        if config.presence.timer_secs == 0 {
            bail!("presence.timer_secs must be greater than zero");
        }

        Ok(config)
    }
}

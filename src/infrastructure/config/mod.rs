//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::services::BotSettings;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub middleware: MiddlewareConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    pub token: Option<String>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MiddlewareConfig {
    /// Minimum seconds between commands per user and channel; 0 disables
    pub cooldown_seconds: f64,
    pub logging: bool,
    /// Permission tags every command requires
    pub required_permissions: Vec<String>,
    /// Restrict every command to `bot.owner-id`
    pub owner_only: bool,
}

/// Development session settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConsoleConfig {
    pub user_id: String,
    pub username: String,
    pub channel_id: String,
    pub permissions: Vec<String>,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 2.0,
            logging: true,
            required_permissions: Vec::new(),
            owner_only: false,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            user_id: "console-user".to_string(),
            username: "console".to_string(),
            channel_id: "console".to_string(),
            permissions: vec!["ADMINISTRATOR".to_string()],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "forge-bot".to_string(),
                prefix: "!".to_string(),
                token: None,
                owner_id: None,
                debug: false,
            },
            middleware: MiddlewareConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Override fields from `BOT_TOKEN`, `BOT_PREFIX`, `BOT_OWNER_ID` and `DEBUG`
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("BOT_TOKEN") {
            self.bot.token = Some(token);
        }

        if let Some(prefix) = var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Some(owner) = var("BOT_OWNER_ID") {
            self.bot.owner_id = Some(owner);
        }

        if let Some(debug) = var("DEBUG") {
            self.bot.debug = debug == "true";
        }
    }

    /// Reject configurations the bot cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(ConfigError::MissingField(
                "bot.token (or BOT_TOKEN environment variable)".to_string(),
            ));
        }

        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }

        self.cooldown()?;

        if self.middleware.owner_only && self.owner_id().is_none() {
            return Err(ConfigError::MissingField(
                "bot.owner-id (required by middleware.owner-only)".to_string(),
            ));
        }

        Ok(())
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.bot.owner_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Configured cooldown; negative, non-finite or out-of-range values are rejected
    pub fn cooldown(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.middleware.cooldown_seconds).map_err(|_| {
            ConfigError::InvalidValue(format!(
                "middleware.cooldown-seconds must be a non-negative number of seconds, got {}",
                self.middleware.cooldown_seconds
            ))
        })
    }

    pub fn settings(&self) -> BotSettings {
        BotSettings {
            name: self.bot.name.clone(),
            prefix: self.bot.prefix.clone(),
            owner_id: self.owner_id().map(str::to_string),
            debug: self.bot.debug,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::auth::AdminId;
use crate::error::BotError;

/// Fully loaded configuration: secrets from the environment plus the
/// optional settings file.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub admin_id: AdminId,
    pub logging: LoggingConfig,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
}

// Keep the token out of logs.
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

/// Non-secret settings read from the TOML file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
            debug: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set. HTTP client
    /// chatter stays at warn unless debug is on.
    pub fn filter_directive(&self) -> String {
        if self.debug {
            "debug".to_string()
        } else {
            format!("{},reqwest=warn,hyper=warn,hyper_util=warn", self.level)
        }
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from("app.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// The two secrets the bot cannot start without.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub token: String,
    pub admin_id: String,
}

impl Secrets {
    /// Resolve secrets through `lookup`; empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(BotError::MissingSecret(key))
        };

        Ok(Self {
            token: require("TOKEN")?,
            admin_id: require("ADMIN_ID")?,
        })
    }

    pub fn from_env() -> Result<Self, BotError> {
        // A .env file is optional; real environment variables win.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl Config {
    pub fn load(settings_path: &Path) -> Result<Self> {
        let settings = Settings::load(settings_path)?;
        let secrets = Secrets::from_env()?;
        Ok(Self::from_parts(secrets, settings))
    }

    pub fn from_parts(secrets: Secrets, settings: Settings) -> Self {
        Self {
            telegram: TelegramConfig {
                bot_token: secrets.token,
            },
            admin_id: AdminId::new(secrets.admin_id),
            logging: settings.logging,
        }
    }
}

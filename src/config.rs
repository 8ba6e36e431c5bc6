use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the Telegram bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_API";
/// Environment variable holding the feedback database path.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

// The token must never end up in logs.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub database_path: PathBuf,
}

impl Config {
    /// Load configuration from an optional TOML file, then apply `.env` and
    /// process environment overrides.
    ///
    /// A missing file is not an error: the bot can be configured purely from
    /// the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        // .env is optional, same as the config file
        dotenvy::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override file values with non-empty variables returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(BOT_TOKEN_ENV) {
            self.telegram.bot_token = token;
        }
        if let Some(path) = non_empty(DATABASE_PATH_ENV) {
            self.storage.database_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            bail!(
                "telegram.bot_token is not set (config file or {} environment variable)",
                BOT_TOKEN_ENV
            );
        }
        if self.storage.database_path.as_os_str().is_empty() {
            bail!(
                "storage.database_path is not set (config file or {} environment variable)",
                DATABASE_PATH_ENV
            );
        }
        Ok(())
    }
}

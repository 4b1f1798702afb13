//! Settings for the `financas` server. Values come from an optional
//! `settings.toml` and from `FINANCAS__*` environment variables, the latter
//! taking precedence (`FINANCAS__DATABASE__URL`, `FINANCAS__AI__API_KEY`, ...).
//!
//! See `settings.example.toml` for every key.
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";
const MAX_SESSION_TTL_DAYS: i64 = 3650;

#[derive(Debug, Deserialize)]
pub struct Database {
    /// `postgres://...` or `sqlite:...`
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Server {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub session_ttl_days: i64,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            session_ttl_days: 30,
        }
    }
}

/// AI parsing is disabled unless `api_key` is set.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ai {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for Ai {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Ai {
    pub fn client_config(&self) -> Option<assistant::OpenAiConfig> {
        let api_key = self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())?;
        Some(assistant::OpenAiConfig {
            api_key: api_key.to_string(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: Database,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub ai: Ai,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var("FINANCAS_SETTINGS")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
        Self::from_config(
            Config::builder()
                .add_source(File::with_name(&path).required(false))
                .add_source(Environment::with_prefix("FINANCAS").separator("__"))
                .build()?,
        )
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&settings.auth.session_ttl_days) {
            return Err(ConfigError::Message(format!(
                "auth.session_ttl_days must be between 1 and {MAX_SESSION_TTL_DAYS}, got {}",
                settings.auth.session_ttl_days
            )));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_config(
            Config::builder()
                .add_source(File::from_str(toml, FileFormat::Toml))
                .build()?,
        )
    }

    #[test]
    fn defaults_apply() {
        let settings = parse("[database]\nurl = \"sqlite::memory:\"").unwrap();
        assert_eq!(settings.server.addr(), "127.0.0.1:3000");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.auth.session_ttl_days, 30);
        assert!(settings.ai.client_config().is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert!(parse("[server]\nport = 8080").is_err());
    }

    #[test]
    fn session_ttl_is_bounded() {
        let settings = parse("[database]\nurl = \"sqlite::memory:\"\n[auth]\nsession_ttl_days = 7");
        assert_eq!(settings.unwrap().auth.session_ttl_days, 7);

        for ttl in ["0", "-1", "3651", "9223372036854775807"] {
            let toml = format!("[database]\nurl = \"sqlite::memory:\"\n[auth]\nsession_ttl_days = {ttl}");
            assert!(parse(&toml).is_err(), "ttl {ttl} accepted");
        }
    }

    #[test]
    fn ai_is_enabled_by_key() {
        let settings = parse(
            "[database]\nurl = \"sqlite::memory:\"\n[ai]\napi_key = \"sk-test\"\ntimeout_secs = 5",
        )
        .unwrap();
        let client = settings.ai.client_config().unwrap();
        assert_eq!(client.model, "gpt-4o-mini");
        assert_eq!(client.timeout, Duration::from_secs(5));
    }
}

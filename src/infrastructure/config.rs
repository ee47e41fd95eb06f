use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, Source};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub gemini: GeminiSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl GeminiSettings {
    /// The credential, treating an empty value as not configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3001)?
        .set_default("server.max_body_bytes", 16 * 1024 * 1024)?
        .set_default("gemini.base_url", DEFAULT_GEMINI_BASE_URL)?
        .set_default("gemini.model", DEFAULT_GEMINI_MODEL)?
        .set_default("gemini.timeout_secs", 30)
}

/// Defaults, then `config/insights.toml`, then `INSIGHTS__*` variables, then
/// `GEMINI_API_KEY`.
pub fn load_settings() -> anyhow::Result<Settings> {
    Ok(settings_from_sources(
        config::File::with_name("config/insights").required(false),
        Environment::with_prefix("INSIGHTS").separator("__"),
        std::env::var(API_KEY_ENV).ok(),
    )?)
}

fn settings_from_sources<F>(
    file: F,
    env: Environment,
    api_key: Option<String>,
) -> Result<Settings, ConfigError>
where
    F: Source + Send + Sync + 'static,
{
    builder_with_defaults()?
        .add_source(file)
        .add_source(env)
        .set_override_option("gemini.api_key", api_key)?
        .build()?
        .try_deserialize()
}

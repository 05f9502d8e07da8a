use thiserror::Error;

const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(&'static str),

    #[error("Environment variable '{key}' has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
/// A missing Gemini key is fatal: the server never binds without it.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    pub max_upload_mb: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        Ok(Config {
            gemini_api_key,
            gemini_model: optional("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_api_base: optional("GEMINI_API_BASE", DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            llm_timeout_secs: parse_number("LLM_TIMEOUT_SECS", optional("LLM_TIMEOUT_SECS", "120"))?,
            max_upload_mb: parse_number("MAX_UPLOAD_MB", optional("MAX_UPLOAD_MB", "10"))?,
            port: parse_number("PORT", optional("PORT", "8080"))?,
            rust_log: optional("RUST_LOG", "info"),
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::Invalid { key, value }),
    }
}

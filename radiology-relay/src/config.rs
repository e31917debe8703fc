use std::time::Duration;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REPORT_MODEL: &str = "gpt-4o";
pub const DEFAULT_REPORT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 800;

/// Runtime settings, read from the environment once at startup.
///
/// The API key may be absent at startup; every relay call checks for it and
/// answers with a configuration error when it is missing.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub api_key: Option<String>,
    pub base_url: String,
    pub report_model: String,
    pub report_max_tokens: u32,
    pub chat_model: String,
    pub chat_max_tokens: u32,
    pub upstream_timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            report_model: DEFAULT_REPORT_MODEL.to_string(),
            report_max_tokens: DEFAULT_REPORT_MAX_TOKENS,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_max_tokens: DEFAULT_CHAT_MAX_TOKENS,
            upstream_timeout: None,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: parse_or(get("PORT"), "PORT", defaults.port),
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            report_model: get("REPORT_MODEL").unwrap_or(defaults.report_model),
            report_max_tokens: parse_or(
                get("REPORT_MAX_TOKENS"),
                "REPORT_MAX_TOKENS",
                defaults.report_max_tokens,
            ),
            chat_model: get("CHAT_MODEL").unwrap_or(defaults.chat_model),
            chat_max_tokens: parse_or(
                get("CHAT_MAX_TOKENS"),
                "CHAT_MAX_TOKENS",
                defaults.chat_max_tokens,
            ),
            upstream_timeout: get("UPSTREAM_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn parse_or<T: std::str::FromStr + Copy>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

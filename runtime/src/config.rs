//! Runtime configuration resolved from environment variables.
//!
//! Every setting has a default, so the service starts with no environment
//! at all. Unparsable values are logged and replaced by the default.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Wait after navigating to a primary page before capturing its HTML.
pub const DEFAULT_SETTLE_MS: u64 = 8_000;
/// Wait after navigating to a secondary page within the same session.
pub const DEFAULT_SECONDARY_SETTLE_MS: u64 = 5_000;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Desktop Chrome user-agent sent by both the HTTP client and the browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/125.0.0.0 Safari/537.36";

/// Settings for static and rendered page fetches.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub settle_delay: Duration,
    pub secondary_settle_delay: Duration,
    pub http_timeout: Duration,
    pub render_timeout: Duration,
    /// Explicit Chromium binary. When `None` the binary is searched for.
    pub chromium_path: Option<PathBuf>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
            secondary_settle_delay: Duration::from_millis(DEFAULT_SECONDARY_SETTLE_MS),
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            render_timeout: Duration::from_millis(DEFAULT_RENDER_TIMEOUT_MS),
            chromium_path: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Settings for the OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Full runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub fetch: FetchConfig,
    pub llm: LlmConfig,
    pub bind: IpAddr,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            llm: LlmConfig::default(),
            bind: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let millis = |key: &str, default: Duration| match get(key) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!(key, value = %raw, "ignoring invalid duration");
                    default
                }
            },
            None => default,
        };

        let fetch = FetchConfig {
            settle_delay: millis("JAPA_SETTLE_MS", defaults.fetch.settle_delay),
            secondary_settle_delay: millis(
                "JAPA_SECONDARY_SETTLE_MS",
                defaults.fetch.secondary_settle_delay,
            ),
            http_timeout: millis("JAPA_HTTP_TIMEOUT_MS", defaults.fetch.http_timeout),
            render_timeout: millis("JAPA_RENDER_TIMEOUT_MS", defaults.fetch.render_timeout),
            chromium_path: get("JAPA_CHROMIUM_PATH").map(PathBuf::from),
            user_agent: defaults.fetch.user_agent,
        };

        let base_url = match get("JAPA_OPENAI_BASE_URL") {
            Some(raw) => Url::parse(&raw).unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "ignoring invalid JAPA_OPENAI_BASE_URL");
                default_base_url()
            }),
            None => default_base_url(),
        };

        let llm = LlmConfig {
            api_key: get("OPENAI_API_KEY"),
            base_url,
            model: get("JAPA_MODEL").unwrap_or(defaults.llm.model),
        };

        let bind = match get("JAPA_BIND") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring invalid JAPA_BIND");
                defaults.bind
            }),
            None => defaults.bind,
        };

        let port = match get("JAPA_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring invalid JAPA_PORT");
                defaults.port
            }),
            None => defaults.port,
        };

        Self {
            fetch,
            llm,
            bind,
            port,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_OPENAI_BASE_URL).expect("default base URL is valid")
}

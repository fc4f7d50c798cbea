use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use analysis_orchestrator::DEFAULT_CACHE_TTL_SECS;
use yahoo_client::YahooConfig;

/// Server settings, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub yahoo: YahooConfig,
    pub cache_ttl_secs: i64,
    pub scoring_config_path: Option<PathBuf>,
}

fn env_or<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {}={:?}: {}", key, raw, e))
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = YahooConfig::default();

        let yahoo = YahooConfig {
            base_url: env::var("YAHOO_BASE_URL").unwrap_or(defaults.base_url),
            rate_limit: env_or("YAHOO_RATE_LIMIT", "100")?,
            timeout: Duration::from_secs(env_or("YAHOO_TIMEOUT_SECS", "30")?),
            retry_wait: defaults.retry_wait,
            default_suffix: env::var("DEFAULT_EXCHANGE_SUFFIX").unwrap_or(defaults.default_suffix),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", "3000")?,
            yahoo,
            cache_ttl_secs: env_or("CACHE_TTL_SECS", &DEFAULT_CACHE_TTL_SECS.to_string())?,
            scoring_config_path: env::var("SCORING_CONFIG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

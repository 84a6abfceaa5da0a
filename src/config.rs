use crate::core::engine::{DEFAULT_MONEY_SCALE, MAX_MONEY_SCALE};
use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::time::Duration;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub money_scale: u32,
    pub settlement_cache_ttl: Duration,
    pub request_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("money_scale", &self.money_scale)
            .field("settlement_cache_ttl_secs", &self.settlement_cache_ttl.as_secs())
            .field("request_timeout_secs", &self.request_timeout.as_secs())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            money_scale: DEFAULT_MONEY_SCALE,
            settlement_cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or unparsable keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse_secs = |key: &str, fallback: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            port: lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(defaults.port),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            money_scale: lookup("MONEY_SCALE")
                .and_then(|v| v.parse::<u32>().ok())
                .map(|s| s.min(MAX_MONEY_SCALE))
                .unwrap_or(defaults.money_scale),
            settlement_cache_ttl: parse_secs("SETTLEMENT_CACHE_TTL_SECS", defaults.settlement_cache_ttl),
            request_timeout: parse_secs("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

use crate::errors::ConfigError;
use std::{env, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_ALERT_TTL_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub alert_ttl: Duration,
    pub backend_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            alert_ttl: Duration::from_secs(DEFAULT_ALERT_TTL_SECS),
            backend_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves settings through `lookup`; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup("PORT") {
            config.port = parse_var("PORT", &value)?;
        }

        if let Some(value) = lookup("BACKEND_URL") {
            let trimmed = value.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid {
                    name: "BACKEND_URL",
                    value,
                });
            }
            config.backend_url = trimmed.to_string();
        }

        if let Some(value) = lookup("ALERT_TTL_SECS") {
            let secs: u64 = parse_var("ALERT_TTL_SECS", &value)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    name: "ALERT_TTL_SECS",
                    value,
                });
            }
            config.alert_ttl = Duration::from_secs(secs);
        }

        if let Some(value) = lookup("BACKEND_TIMEOUT_SECS") {
            let secs: u64 = parse_var("BACKEND_TIMEOUT_SECS", &value)?;
            config.backend_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

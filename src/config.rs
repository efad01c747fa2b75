// ⚙️ Configuration - defaults overridable from the environment

use crate::bridge::{BridgeError, PredictionClient};
use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000/invocations";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Initial value of the URL field (`PREDICT_URL`)
    pub service_url: String,
    /// Upper bound on one prediction request (`PREDICT_TIMEOUT_SECS`)
    pub timeout: Duration,
    /// Web server bind host (`HOST`)
    pub host: String,
    /// Web server bind port (`PORT`)
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Config::default();

        if let Some(url) = read("PREDICT_URL") {
            config.service_url = url;
        }

        if let Some(raw) = read("PREDICT_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("PREDICT_TIMEOUT_SECS must be a whole number of seconds, got {:?}", raw))?;
            if secs == 0 {
                return Err(anyhow!("PREDICT_TIMEOUT_SECS must be greater than zero"));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(host) = read("HOST") {
            config.host = host;
        }

        if let Some(raw) = read("PORT") {
            config.port = raw
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", raw))?;
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// HTTP client honouring the configured timeout
    pub fn client(&self) -> Result<PredictionClient, BridgeError> {
        PredictionClient::new(self.timeout)
    }
}

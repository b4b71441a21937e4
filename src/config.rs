//! Client configuration that can be loaded from JSON or the environment.

use crate::error::{Result, TwoCaptchaError};
use crate::transport::DEFAULT_SERVER;
use serde::{Deserialize, Serialize};

/// Seconds to wait for a regular captcha.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Seconds to wait for a reCAPTCHA.
pub const RECAPTCHA_TIMEOUT_SECS: u64 = 600;
/// Seconds between two `res.php` polls.
pub const POLLING_INTERVAL_SECS: u64 = 10;

/// Settings of a [`crate::TwoCaptcha`] client. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_key: String,
    pub server: String,
    /// Attribution code of the integrating software
    pub soft_id: Option<u32>,
    /// Pingback URL attached to every submission
    pub callback: Option<String>,
    /// Seconds
    pub default_timeout: u64,
    /// Seconds
    pub recaptcha_timeout: u64,
    /// Seconds
    pub polling_interval: u64,
    /// Ask the service for JSON bodies instead of plain text
    pub json: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            server: DEFAULT_SERVER.to_string(),
            soft_id: None,
            callback: None,
            default_timeout: DEFAULT_TIMEOUT_SECS,
            recaptcha_timeout: RECAPTCHA_TIMEOUT_SECS,
            polling_interval: POLLING_INTERVAL_SECS,
            json: false,
        }
    }
}

impl ClientConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read `TWOCAPTCHA_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup("TWOCAPTCHA_API_KEY") {
            config.api_key = key;
        }
        if let Some(server) = lookup("TWOCAPTCHA_SERVER") {
            config.server = server;
        }
        if let Some(soft_id) = lookup("TWOCAPTCHA_SOFT_ID") {
            config.soft_id = Some(parse_number("TWOCAPTCHA_SOFT_ID", &soft_id)?);
        }
        if let Some(callback) = lookup("TWOCAPTCHA_CALLBACK") {
            config.callback = Some(callback);
        }
        if let Some(secs) = lookup("TWOCAPTCHA_DEFAULT_TIMEOUT") {
            config.default_timeout = parse_number("TWOCAPTCHA_DEFAULT_TIMEOUT", &secs)?;
        }
        if let Some(secs) = lookup("TWOCAPTCHA_RECAPTCHA_TIMEOUT") {
            config.recaptcha_timeout = parse_number("TWOCAPTCHA_RECAPTCHA_TIMEOUT", &secs)?;
        }
        if let Some(secs) = lookup("TWOCAPTCHA_POLLING_INTERVAL") {
            config.polling_interval = parse_number("TWOCAPTCHA_POLLING_INTERVAL", &secs)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        TwoCaptchaError::Validation(format!("{} must be a whole number, got '{}'", name, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server, "http://2captcha.com");
        assert_eq!(config.default_timeout, 120);
        assert_eq!(config.recaptcha_timeout, 600);
        assert_eq!(config.polling_interval, 10);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ClientConfig::from_json(r#"{"apiKey":"abc","pollingInterval":5}"#).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.polling_interval, 5);
        assert_eq!(config.default_timeout, 120);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("TWOCAPTCHA_API_KEY", "secret"),
            ("TWOCAPTCHA_SOFT_ID", "4580"),
            ("TWOCAPTCHA_DEFAULT_TIMEOUT", "60"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.soft_id, Some(4580));
        assert_eq!(config.default_timeout, 60);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = ClientConfig::from_lookup(|name| {
            (name == "TWOCAPTCHA_POLLING_INTERVAL").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(TwoCaptchaError::Validation(_))));
    }
}

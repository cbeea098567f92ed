//! Runtime configuration loaded from environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SEARCH_API: &str = "https://search.mql5.com/api/query";
pub const DEFAULT_MAX_CHARS: usize = 4000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid search API URL '{url}': {reason}")]
    InvalidSearchApi { url: String, reason: String },

    #[error("{0} must be greater than 0")]
    Zero(&'static str),
}

/// Configuration shared by both server binaries
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Documentation search endpoint queried with GET
    pub search_api_url: String,
    pub target_site: String,
    /// Module hint sent to the search API; results from other modules still qualify
    pub docs_module: String,
    pub language: String,
    pub result_count: u32,
    /// Outbound search budget per sliding minute
    pub calls_per_minute: usize,
    pub cache_capacity: usize,
    pub request_timeout_secs: u64,
    pub log_dir: PathBuf,
    pub http_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_api_url: DEFAULT_SEARCH_API.to_string(),
            target_site: "mql5.com".to_string(),
            docs_module: "mql5.com.en.docs".to_string(),
            language: "en".to_string(),
            result_count: 10,
            calls_per_minute: 10,
            cache_capacity: 50,
            request_timeout_secs: 30,
            log_dir: PathBuf::from("logs"),
            http_addr: "0.0.0.0:5000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            search_api_url: env::var("MQL5_SEARCH_API").unwrap_or(defaults.search_api_url),
            target_site: env::var("MQL5_TARGET_SITE").unwrap_or(defaults.target_site),
            docs_module: env::var("MQL5_DOCS_MODULE").unwrap_or(defaults.docs_module),
            language: env::var("MQL5_LANGUAGE").unwrap_or(defaults.language),
            result_count: parse_var("MQL5_RESULT_COUNT").unwrap_or(defaults.result_count),
            calls_per_minute: parse_var("MQL5_CALLS_PER_MINUTE")
                .unwrap_or(defaults.calls_per_minute),
            cache_capacity: parse_var("MQL5_CACHE_CAPACITY").unwrap_or(defaults.cache_capacity),
            request_timeout_secs: parse_var("MQL5_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            log_dir: env::var("MQL5_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            http_addr: env::var("MCP_HTTP_ADDR").unwrap_or(defaults.http_addr),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.search_api_url).map_err(|e| {
            ConfigError::InvalidSearchApi {
                url: self.search_api_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidSearchApi {
                url: self.search_api_url.clone(),
                reason: "scheme must be http or https".to_string(),
            });
        }
        if self.calls_per_minute == 0 {
            return Err(ConfigError::Zero("calls_per_minute"));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Zero("cache_capacity"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("request_timeout_secs"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.calls_per_minute, 10);
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.search_api_url, DEFAULT_SEARCH_API);
    }

    #[test]
    fn test_rejects_non_http_search_api() {
        let config = Config {
            search_api_url: "ftp://search.mql5.com/api/query".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSearchApi { .. })
        ));

        let config = Config {
            search_api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_limits() {
        let config = Config {
            calls_per_minute: 0,
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero("calls_per_minute"))
        );

        let config = Config {
            cache_capacity: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Zero("cache_capacity")));
    }

    #[test]
    fn test_request_timeout() {
        let config = Config {
            request_timeout_secs: 7,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(7));
    }
}

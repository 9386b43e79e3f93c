//! Configuration management
//!
//! TOML-backed configuration with environment overrides; the API base URL
//! comes from `RENTLY_API_URL` when set.

use crate::error::{ErrorContext, RentlyError, RentlyResult};
use crate::logging::LoggingConfig;
use crate::types::{ApiConfig, CacheConfig, RentlyConfig, SessionConfig};

use std::path::Path;

/// Environment variable overriding `api.base_url`
pub const ENV_API_URL: &str = "RENTLY_API_URL";

impl Default for RentlyConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:3333".to_string(),
                timeout_seconds: 30,
                user_agent: "rently/0.1".to_string(),
            },
            session: SessionConfig {
                cookie_file: None,
                expiry_days: 7,
            },
            cache: CacheConfig {
                default_stale_seconds: 300,
                screen_stale_seconds: 120,
                gc_seconds: 600,
                read_retries: 3,
                write_retries: 1,
                refetch_on_reconnect: true,
                refetch_on_focus: false,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl RentlyConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RentlyResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RentlyError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: RentlyConfig = toml::from_str(&content).map_err(|e| RentlyError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults, then apply environment
    /// overrides
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> RentlyResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(base_url) = std::env::var(ENV_API_URL) {
            if !base_url.is_empty() {
                config.api.base_url = base_url;
            }
        }

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RentlyResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| RentlyError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| RentlyError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> RentlyResult<()> {
        url::Url::parse(&self.api.base_url).map_err(|e| RentlyError::Config {
            message: format!("Invalid API base URL '{}': {}", self.api.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Set api.base_url to an absolute http(s) URL"),
        })?;

        if self.api.timeout_seconds == 0 {
            return Err(RentlyError::Config {
                message: "API timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.timeout_seconds to a positive value"),
            });
        }

        if self.session.expiry_days <= 0 {
            return Err(RentlyError::Config {
                message: "Session expiry_days must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set session.expiry_days to a positive value"),
            });
        }

        if self.cache.default_stale_seconds == 0 || self.cache.gc_seconds == 0 {
            return Err(RentlyError::Config {
                message: "Cache windows must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set cache.default_stale_seconds and cache.gc_seconds"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RentlyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.expiry_days, 7);
        assert_eq!(config.cache.read_retries, 3);
        assert_eq!(config.cache.write_retries, 1);
        assert!(config.cache.refetch_on_reconnect);
        assert!(!config.cache.refetch_on_focus);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rently.toml");

        let mut config = RentlyConfig::default();
        config.api.base_url = "https://api.example.com".to_string();
        config.cache.screen_stale_seconds = 60;
        config.save_to_file(&path).unwrap();

        let loaded = RentlyConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://api.example.com");
        assert_eq!(loaded.cache.screen_stale_seconds, 60);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = RentlyConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_expiry_rejected() {
        let mut config = RentlyConfig::default();
        config.session.expiry_days = 0;
        assert!(config.validate().is_err());
    }
}

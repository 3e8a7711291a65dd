//! Configuration management for the `OutfitAI` backend
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::OutfitAiError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `OutfitAI` backend
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutfitAiConfig {
    /// Upstream weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Region directory configuration
    #[serde(default)]
    pub regions: RegionsConfig,
    /// Calendar storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream weather API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Upstream auth key
    pub auth_key: Option<String>,
    /// Forecast table endpoint
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    /// Advisory endpoint
    #[serde(default = "default_advisory_base_url")]
    pub advisory_base_url: String,
    /// IP geolocation endpoint
    #[serde(default = "default_geolocation_base_url")]
    pub geolocation_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Forecast cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_hours: u32,
}

/// Region directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsConfig {
    /// Path to the static region directory JSON resource
    #[serde(default = "default_regions_path")]
    pub directory_path: String,
}

/// Calendar storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database location
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_forecast_base_url() -> String {
    "https://apihub.kma.go.kr/api/typ01/url/fct_afs_dl.php".to_string()
}

fn default_advisory_base_url() -> String {
    "https://apihub.kma.go.kr/api/typ01/url/wrn_met_data.php".to_string()
}

fn default_geolocation_base_url() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_cache_ttl() -> u32 {
    3
}

fn default_regions_path() -> String {
    "data/regions.json".to_string()
}

fn default_database_path() -> String {
    "outfitai.db".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            auth_key: None,
            forecast_base_url: default_forecast_base_url(),
            advisory_base_url: default_advisory_base_url(),
            geolocation_base_url: default_geolocation_base_url(),
            timeout_seconds: default_weather_timeout(),
            cache_ttl_hours: default_cache_ttl(),
        }
    }
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            directory_path: default_regions_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl OutfitAiConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with OUTFITAI_ prefix
        builder = builder.add_source(
            Environment::with_prefix("OUTFITAI")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: OutfitAiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("outfitai").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if let Some(auth_key) = &self.weather.auth_key {
            if auth_key.is_empty() {
                return Err(OutfitAiError::config(
                    "Weather auth key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }
        }

        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 300 {
            return Err(
                OutfitAiError::config("Weather API timeout must be between 1 and 300 seconds")
                    .into(),
            );
        }

        if self.weather.cache_ttl_hours == 0 || self.weather.cache_ttl_hours > 24 {
            return Err(
                OutfitAiError::config("Forecast cache TTL must be between 1 and 24 hours").into(),
            );
        }

        for url in [
            &self.weather.forecast_base_url,
            &self.weather.advisory_base_url,
            &self.weather.geolocation_base_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(OutfitAiError::config(format!(
                    "Upstream base URL must be a valid HTTP or HTTPS URL: {url}"
                ))
                .into());
            }
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(OutfitAiError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OutfitAiConfig::default();
        assert!(config.weather.auth_key.is_none());
        assert_eq!(config.weather.cache_ttl_hours, 3);
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.regions.directory_path, "data/regions.json");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_auth_key() {
        let mut config = OutfitAiConfig::default();
        config.weather.auth_key = Some(String::new());
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("auth key cannot be empty")
        );
    }

    #[test]
    fn test_config_validation_ttl_range() {
        let mut config = OutfitAiConfig::default();
        config.weather.cache_ttl_hours = 0;
        assert!(config.validate().is_err());
        config.weather.cache_ttl_hours = 48;
        assert!(config.validate().is_err());
        config.weather.cache_ttl_hours = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = OutfitAiConfig::default();
        config.logging.level = "chatty".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid log level")
        );
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = OutfitAiConfig::default();
        config.weather.geolocation_base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_path_generation() {
        let path = OutfitAiConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("outfitai"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}

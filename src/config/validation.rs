//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use url::Url;

use super::Settings;
use crate::utils::errors::{EventboardError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_stats_config(&settings.stats)?;
    validate_logging_config(&settings.logging)?;
    Ok(())
}

/// Validate HTTP server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventboardError::Config(
            "Server host is required".to_string(),
        ));
    }

    if config.port == 0 {
        return Err(EventboardError::Config(
            "Server port must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventboardError::Config(
            "Database URL is required".to_string(),
        ));
    }

    if config.max_connections == 0 {
        return Err(EventboardError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventboardError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate view-stats service configuration
fn validate_stats_config(config: &super::StatsConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(EventboardError::Config(
            "Stats service base URL is required".to_string(),
        ));
    }

    if Url::parse(&config.base_url).is_err() {
        return Err(EventboardError::Config(format!(
            "Stats service base URL '{}' is not a valid URL",
            config.base_url
        )));
    }

    if config.app_name.is_empty() {
        return Err(EventboardError::Config(
            "Stats application name is required".to_string(),
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(EventboardError::Config(
            "Stats timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventboardError::Config(
            "Logging level is required".to_string(),
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    let base_level = config.level.split(',').next().unwrap_or("");
    if !valid_levels.contains(&base_level) && !base_level.contains('=') {
        return Err(EventboardError::Config(format!(
            "Unknown logging level '{}'",
            config.level
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_validate() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn rejects_zero_port() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        settings.database.max_connections = 5;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_unparseable_stats_url() {
        let mut settings = Settings::default();
        settings.stats.base_url = "not a url".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_zero_stats_timeout() {
        let mut settings = Settings::default();
        settings.stats.timeout_seconds = 0;
        assert!(validate_settings(&settings).is_err());
    }
}

//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values after
//! they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use crate::times::{AsrSchool, CalculationMethod};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` or `shell_version` is empty
    /// - `authority_base_url` / `app_origin` is not an http(s) URL
    /// - only one of latitude/longitude is set, or either is out of range
    /// - `timezone_offset` is outside [-12, 14]
    /// - `method` or `school` is not a known authority code
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }
        if self.shell_version.is_empty() {
            return Err(ConfigError::Invalid { field: "shell_version".into(), reason: "must not be empty".into() });
        }

        for (field, value) in [("authority_base_url", &self.authority_base_url), ("app_origin", &self.app_origin)] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: "must be an http(s) URL".into(),
                });
            }
        }

        match (self.latitude, self.longitude) {
            (None, None) => {}
            (Some(lat), Some(lng)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(ConfigError::Invalid {
                        field: "latitude".into(),
                        reason: format!("out of range: {lat}"),
                    });
                }
                if !(-180.0..=180.0).contains(&lng) {
                    return Err(ConfigError::Invalid {
                        field: "longitude".into(),
                        reason: format!("out of range: {lng}"),
                    });
                }
            }
            _ => {
                return Err(ConfigError::Invalid {
                    field: "latitude/longitude".into(),
                    reason: "must be set together".into(),
                });
            }
        }

        if !(-12.0..=14.0).contains(&self.timezone_offset) {
            return Err(ConfigError::Invalid {
                field: "timezone_offset".into(),
                reason: format!("out of range: {}", self.timezone_offset),
            });
        }

        if CalculationMethod::from_code(&self.method).is_none() {
            return Err(ConfigError::Invalid {
                field: "method".into(),
                reason: format!("unknown authority code: {}", self.method),
            });
        }
        if AsrSchool::from_code(self.school).is_none() {
            return Err(ConfigError::Invalid {
                field: "school".into(),
                reason: format!("unknown authority code: {}", self.school),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_empty_shell_version() {
        let config = AppConfig { shell_version: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "shell_version"));
    }

    #[test]
    fn test_validate_bad_authority_url() {
        let config = AppConfig { authority_base_url: "ftp://api.aladhan.com".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "authority_base_url"));
    }

    #[test]
    fn test_validate_half_coordinate() {
        let config = AppConfig { latitude: Some(23.8), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "latitude/longitude"));
    }

    #[test]
    fn test_validate_latitude_out_of_range() {
        let config = AppConfig { latitude: Some(91.0), longitude: Some(0.0), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "latitude"));
    }

    #[test]
    fn test_validate_unknown_method() {
        let config = AppConfig { method: "9".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "method"));
    }

    #[test]
    fn test_validate_unknown_school() {
        let config = AppConfig { school: 7, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "school"));
    }

    #[test]
    fn test_validate_timezone_bounds() {
        let config = AppConfig { timezone_offset: 15.0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timezone_offset"));
    }

    #[test]
    fn test_validate_valid_coordinate_pair() {
        let config = AppConfig { latitude: Some(21.4272), longitude: Some(92.0058), ..Default::default() };
        assert!(config.validate().is_ok());
    }
}

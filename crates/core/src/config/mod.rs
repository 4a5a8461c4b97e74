//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for
//! layered configuration loading from multiple sources:
//!
//! 1. Environment variables (SALAH_*)
//! 2. TOML config file (if SALAH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::times::{AsrSchool, CalculationMethod, Coordinate, DHAKA, city_coordinate};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SALAH_*)
/// 2. TOML config file (if SALAH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Base URL of the remote timing authority.
    #[serde(default = "default_authority_base_url")]
    pub authority_base_url: String,

    /// Origin the shell manifest paths are resolved against.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// Versioned shell cache namespace; bumped on each deploy.
    #[serde(default = "default_shell_version")]
    pub shell_version: String,

    /// Named city used when no explicit coordinate is given.
    #[serde(default = "default_city")]
    pub city: String,

    /// Explicit latitude override (requires `longitude`).
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Explicit longitude override (requires `latitude`).
    #[serde(default)]
    pub longitude: Option<f64>,

    /// UTC offset in hours for local clock times.
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: f64,

    /// Calculation method authority code ("1".."5").
    #[serde(default = "default_method")]
    pub method: String,

    /// Asr school authority code (0 = Standard, 1 = Hanafi).
    #[serde(default)]
    pub school: u8,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./salah-cache.sqlite")
}

fn default_user_agent() -> String {
    "salah/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_authority_base_url() -> String {
    "https://api.aladhan.com".into()
}

fn default_app_origin() -> String {
    "http://localhost:5173".into()
}

fn default_shell_version() -> String {
    "ramadan-hub-v1".into()
}

fn default_city() -> String {
    "Dhaka".into()
}

fn default_timezone_offset() -> f64 {
    6.0
}

fn default_method() -> String {
    "1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            authority_base_url: default_authority_base_url(),
            app_origin: default_app_origin(),
            shell_version: default_shell_version(),
            city: default_city(),
            latitude: None,
            longitude: None,
            timezone_offset: default_timezone_offset(),
            method: default_method(),
            school: 0,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SALAH_`
    /// 2. TOML file from `SALAH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or validation
    /// fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SALAH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SALAH_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Resolve the configured coordinate.
    ///
    /// An explicit latitude/longitude pair wins; otherwise the named
    /// city is looked up, falling back to Dhaka for unknown names.
    pub fn coordinate(&self) -> Coordinate {
        if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
            return Coordinate { latitude, longitude };
        }
        city_coordinate(&self.city).unwrap_or_else(|| {
            tracing::warn!(city = %self.city, "unknown city, using Dhaka");
            DHAKA
        })
    }

    /// The configured calculation method (validated at load time).
    pub fn calculation_method(&self) -> CalculationMethod {
        CalculationMethod::from_code(&self.method).unwrap_or_default()
    }

    /// The configured asr school (validated at load time).
    pub fn asr_school(&self) -> AsrSchool {
        AsrSchool::from_code(self.school).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./salah-cache.sqlite"));
        assert_eq!(config.user_agent, "salah/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.authority_base_url, "https://api.aladhan.com");
        assert_eq!(config.shell_version, "ramadan-hub-v1");
        assert_eq!(config.city, "Dhaka");
        assert_eq!(config.method, "1");
        assert_eq!(config.school, 0);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_coordinate_override_wins() {
        let config = AppConfig { latitude: Some(22.35), longitude: Some(91.78), ..Default::default() };
        let coord = config.coordinate();
        assert!((coord.latitude - 22.35).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_city_lookup() {
        let config = AppConfig { city: "Sylhet".into(), ..Default::default() };
        let coord = config.coordinate();
        assert!((coord.latitude - 24.8949).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_unknown_city_falls_back_to_dhaka() {
        let config = AppConfig { city: "Atlantis".into(), ..Default::default() };
        let coord = config.coordinate();
        assert!((coord.latitude - DHAKA.latitude).abs() < 1e-9);
    }

    #[test]
    fn test_method_and_school_accessors() {
        let config = AppConfig { method: "4".into(), school: 1, ..Default::default() };
        assert_eq!(config.calculation_method(), CalculationMethod::Makkah);
        assert_eq!(config.asr_school(), AsrSchool::Hanafi);
    }
}

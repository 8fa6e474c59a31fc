//! Configuration management for `CarbonTrail`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::CarbonError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonTrailConfig {
    /// Geocoding and directions provider
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Open product database
    #[serde(default)]
    pub product_database: ProductDatabaseConfig,
    /// Emission estimation API
    #[serde(default)]
    pub estimation: EstimationConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Provider API key
    pub api_key: Option<String>,
    /// Base URL of the maps API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Product database settings (no key required)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDatabaseConfig {
    #[serde(default = "default_product_database_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Estimation API settings. The tier is skipped when no key is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_estimation_base_url")]
    pub base_url: String,
    /// Region passed with every estimate (the food factor only exists for GB)
    #[serde(default = "default_estimation_region")]
    pub region: String,
    #[serde(default = "default_estimation_data_version")]
    pub data_version: String,
    /// Weight-based food activity used as the baseline
    #[serde(default = "default_estimation_activity_id")]
    pub activity_id: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// Geocode TTL in hours
    #[serde(default = "default_geocode_ttl")]
    pub geocode_ttl_hours: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_product_database_base_url() -> String {
    "https://world.openfoodfacts.org/api/v2/product/".to_string()
}

fn default_estimation_base_url() -> String {
    "https://api.climatiq.io".to_string()
}

fn default_estimation_region() -> String {
    "GB".to_string()
}

fn default_estimation_data_version() -> String {
    "^3".to_string()
}

fn default_estimation_activity_id() -> String {
    "consumer_goods-type_food_and_drink_primary_material_production".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_cache_location() -> String {
    "~/.cache/carbontrail".to_string()
}

fn default_geocode_ttl() -> u32 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ProductDatabaseConfig {
    fn default() -> Self {
        Self {
            base_url: default_product_database_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_estimation_base_url(),
            region: default_estimation_region(),
            data_version: default_estimation_data_version(),
            activity_id: default_estimation_activity_id(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
            geocode_ttl_hours: default_geocode_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for CarbonTrailConfig {
    fn default() -> Self {
        Self {
            geocoding: GeocodingConfig::default(),
            product_database: ProductDatabaseConfig::default(),
            estimation: EstimationConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CarbonTrailConfig {
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

        // Environment overrides, e.g. CARBONTRAIL_GEOCODING__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("CARBONTRAIL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CarbonTrailConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("carbontrail").join("config.toml"))
    }

    /// Cache directory with a leading `~` expanded
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        match self.cache.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.cache.location),
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_timeout();
        }
        if self.product_database.base_url.is_empty() {
            self.product_database.base_url = default_product_database_base_url();
        }
        if self.product_database.timeout_seconds == 0 {
            self.product_database.timeout_seconds = default_timeout();
        }
        if self.estimation.base_url.is_empty() {
            self.estimation.base_url = default_estimation_base_url();
        }
        if self.estimation.region.is_empty() {
            self.estimation.region = default_estimation_region();
        }
        if self.estimation.data_version.is_empty() {
            self.estimation.data_version = default_estimation_data_version();
        }
        if self.estimation.activity_id.is_empty() {
            self.estimation.activity_id = default_estimation_activity_id();
        }
        if self.estimation.timeout_seconds == 0 {
            self.estimation.timeout_seconds = default_timeout();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.geocode_ttl_hours == 0 {
            self.cache.geocode_ttl_hours = default_geocode_ttl();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("Geocoding", &self.geocoding.api_key),
            ("Estimation", &self.estimation.api_key),
        ];

        for (name, key) in keys {
            let Some(key) = key else { continue };
            if key.is_empty() {
                return Err(CarbonError::config(format!(
                    "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                ))
                .into());
            }
            if key.len() < 8 {
                return Err(CarbonError::config(format!(
                    "{name} API key appears to be invalid (too short). Please check your API key."
                ))
                .into());
            }
            if key.len() > 200 {
                return Err(CarbonError::config(format!(
                    "{name} API key appears to be invalid (too long). Please check your API key."
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("Geocoding", self.geocoding.timeout_seconds, self.geocoding.max_retries),
            (
                "Product database",
                self.product_database.timeout_seconds,
                self.product_database.max_retries,
            ),
            ("Estimation", self.estimation.timeout_seconds, self.estimation.max_retries),
        ];

        for (name, timeout, retries) in timeouts {
            if timeout > 300 {
                return Err(CarbonError::config(format!(
                    "{name} API timeout cannot exceed 300 seconds"
                ))
                .into());
            }
            if retries > 10 {
                return Err(
                    CarbonError::config(format!("{name} API max retries cannot exceed 10")).into(),
                );
            }
        }

        if self.cache.geocode_ttl_hours > 720 {
            return Err(
                CarbonError::config("Geocode cache TTL cannot exceed 720 hours (30 days)").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CarbonError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CarbonError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Geocoding", &self.geocoding.base_url),
            ("Product database", &self.product_database.base_url),
            ("Estimation", &self.estimation.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CarbonError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

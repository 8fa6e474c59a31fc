//! Error types and handling for `CarbonTrail`

use std::fmt;

use thiserror::Error;

use crate::models::TransportMode;

/// Main error type for collaborator plumbing (HTTP clients, stores, config)
#[derive(Error, Debug)]
pub enum CarbonError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache or store operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CarbonError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CarbonError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            CarbonError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            CarbonError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            CarbonError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            CarbonError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for CarbonError {
    fn from(err: reqwest::Error) -> Self {
        CarbonError::api(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for CarbonError {
    fn from(err: reqwest_middleware::Error) -> Self {
        CarbonError::api(err.to_string())
    }
}

impl From<anyhow::Error> for CarbonError {
    fn from(err: anyhow::Error) -> Self {
        CarbonError::cache(err.to_string())
    }
}

/// Which end of a trip an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Origin,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Origin => f.write_str("origin"),
            Endpoint::Destination => f.write_str("destination"),
        }
    }
}

/// Terminal failures of travel pricing. None of these are retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TripError {
    #[error("{mode} trips cannot be logged for emissions")]
    UnsupportedMode { mode: TransportMode },

    #[error("{side} address could not be geocoded: {address}")]
    GeocodeFailed { side: Endpoint, address: String },

    #[error("no route could be found between origin and destination")]
    NoRouteFound,

    #[error("{mode} is not plausible for this trip: {reason}")]
    ImplausibleMode { mode: TransportMode, reason: String },

    #[error("carbon emission factor not found for transport mode {mode}")]
    FactorNotFound { mode: TransportMode },
}

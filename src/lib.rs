//! `CarbonTrail` - Carbon-emission estimation for travel legs and consumer products
//!
//! This library validates and prices claimed trips using geocoded addresses
//! and geography rules, and resolves carbon factors for barcodes and dish
//! labels through a cascade of data sources.

pub mod cache;
pub mod config;
pub mod error;
pub mod factors;
pub mod geocoding;
mod http;
pub mod models;
pub mod telemetry;
pub mod travel;

// Re-export core types for public API
pub use config::CarbonTrailConfig;
pub use error::{CarbonError, Endpoint, TripError};
pub use factors::CarbonFactorResolver;
pub use models::{
    CarbonCategory, CarbonFactor, FactorKey, GeocodeResult, ProductRecord, Provenance,
    RouteResult, TransportMode,
};
pub use travel::{TripEstimate, TripPricer, TripRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CarbonError>;

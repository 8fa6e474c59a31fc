//! Data models for the `CarbonTrail` library
//!
//! - Geo: coordinates, geocode and route results
//! - Transport: the closed set of transport modes
//! - Factor: carbon factors, resolution keys and product records

pub mod factor;
pub mod geo;
pub mod transport;

pub use factor::{CarbonCategory, CarbonFactor, FactorKey, ProductRecord, Provenance};
pub use geo::{Coordinates, GeocodeResult, RouteResult};
pub use transport::TransportMode;

//! Address geocoding and routing
//!
//! [`GeocodingProvider`] talks to the maps backend, [`GeocodingCache`] keeps
//! resolved addresses around so repeated trips do not hit the provider.

pub mod cache;
pub mod google;

use async_trait::async_trait;

use crate::Result;
use crate::models::{Coordinates, GeocodeResult, RouteResult, TransportMode};

pub use cache::{InMemoryGeocodingCache, PersistentGeocodingCache};
pub use google::GoogleMapsClient;

/// Resolves addresses and routes. `Ok(None)` means the provider had no answer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>>;

    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TransportMode,
    ) -> Result<Option<RouteResult>>;
}

/// Address to geocode cache. A miss is a normal outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocodingCache: Send + Sync {
    async fn get(&self, address: &str) -> Result<Option<GeocodeResult>>;

    async fn put(&self, address: &str, result: &GeocodeResult) -> Result<()>;
}

/// Cache key for an address: trimmed and lowercased
#[must_use]
pub fn normalize_address(address: &str) -> String {
    format!("geocode:{}", address.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address_ignores_case_and_padding() {
        assert_eq!(
            normalize_address("  Marina Bay Sands "),
            normalize_address("marina bay sands")
        );
        assert_eq!(normalize_address("NUS"), "geocode:nus");
    }
}

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::GeocodingProvider;
use crate::config::GeocodingConfig;
use crate::http::build_client;
use crate::models::{Coordinates, GeocodeResult, RouteResult, TransportMode};
use crate::{CarbonError, Result};

// Local short names that only make sense as Singapore places
const SINGAPORE_SHORT_NAMES: &[&str] = &[
    "NUS",
    "NTU",
    "SMU",
    "SUTD",
    "SIT",
    "SUSS",
    "SIM",
    "Orchard",
    "Marina Bay",
    "Changi",
    "Sentosa",
    "Jurong",
    "Woodlands",
    "CBD",
    "Raffles",
    "Bugis",
    "Tampines",
    "Bishan",
    "Ang Mo Kio",
];

/// Google Maps Geocoding and Directions client
pub struct GoogleMapsClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl GoogleMapsClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| CarbonError::config("Geocoding API key is not configured"))?;

        Ok(Self {
            client: build_client(config.timeout_seconds, config.max_retries)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl GeocodingProvider for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>> {
        let query = normalize_for_singapore(address);
        let mut url = format!(
            "{}/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(&query),
            self.api_key
        );
        if mentions_singapore(&query) {
            url.push_str("&region=sg");
        }

        debug!("Calling the geocoding API");
        let response: GeocodeResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let status = response.status.clone();
        let result = response.into_result(address);
        if result.is_none() {
            warn!(%status, "Geocoding returned no usable result");
        }
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        mode: TransportMode,
    ) -> Result<Option<RouteResult>> {
        let url = format!(
            "{}/directions/json?origin={},{}&destination={},{}&mode={}&key={}",
            self.base_url,
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude,
            mode.routing_profile(),
            self.api_key
        );

        debug!("Calling the directions API");
        let response: DirectionsResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let status = response.status.clone();
        let route = response.into_route();
        if route.is_none() {
            warn!(%status, "Directions returned no route");
        }
        Ok(route)
    }
}

fn mentions_singapore(address: &str) -> bool {
    address.to_lowercase().contains("singapore") || address.contains("新加坡")
}

/// Append " Singapore" to postal codes and known local short names so
/// they do not resolve to places abroad. Everything else is left alone.
fn normalize_for_singapore(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.is_empty() || mentions_singapore(trimmed) {
        return trimmed.to_string();
    }

    let is_postal_code = trimmed.len() == 6 && trimmed.chars().all(|c| c.is_ascii_digit());
    let is_short_name = SINGAPORE_SHORT_NAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(trimmed));

    if is_postal_code || is_short_name {
        debug!(address = trimmed, "Treating address as a Singapore location");
        format!("{trimmed} Singapore")
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    formatted_address: Option<String>,
    geometry: Option<Geometry>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|t| t == wanted)
    }
}

impl GeocodeResponse {
    fn into_result(self, requested: &str) -> Option<GeocodeResult> {
        if self.status != "OK" {
            return None;
        }
        let entry = self.results.into_iter().next()?;
        let location = entry.geometry?.location;

        let components = &entry.address_components;
        let country = components
            .iter()
            .find(|c| c.has_type("country"))
            .map(|c| c.long_name.clone());
        let city = components
            .iter()
            .find(|c| c.has_type("locality"))
            .or_else(|| {
                components
                    .iter()
                    .find(|c| c.has_type("administrative_area_level_1"))
            })
            .map(|c| c.long_name.clone());

        Some(GeocodeResult {
            latitude: location.lat,
            longitude: location.lng,
            formatted_address: entry
                .formatted_address
                .unwrap_or_else(|| requested.to_string()),
            city,
            country,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<Leg>,
    overview_polyline: Option<Polyline>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

impl DirectionsResponse {
    fn into_route(self) -> Option<RouteResult> {
        if self.status != "OK" {
            return None;
        }
        let route = self.routes.into_iter().next()?;
        let leg = route.legs.into_iter().next()?;

        Some(RouteResult {
            distance_meters: leg.distance.map_or(0, |d| d.value),
            duration_seconds: leg.duration.map_or(0, |d| d.value),
            polyline: route.overview_polyline.map(|p| p.points),
        })
    }
}

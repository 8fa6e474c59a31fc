//! Geocoding and routing results

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another point in kilometers
    #[must_use]
    pub fn distance_km_to(&self, other: &Coordinates) -> f64 {
        distance(
            HaversineLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            HaversineLocation {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            Units::Kilometers,
        )
    }
}

/// A resolved address. Produced by a geocoding provider or read from cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl GeocodeResult {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Case-insensitive city comparison; unknown cities never match
    #[must_use]
    pub fn same_city_as(&self, other: &GeocodeResult) -> bool {
        same_name(self.city.as_deref(), other.city.as_deref())
    }

    /// Case-insensitive country comparison; unknown countries never match
    #[must_use]
    pub fn same_country_as(&self, other: &GeocodeResult) -> bool {
        same_name(self.country.as_deref(), other.country.as_deref())
    }
}

fn same_name(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            let a = a.trim().to_lowercase();
            !a.is_empty() && a == b.trim().to_lowercase()
        }
        _ => false,
    }
}

/// Route between two points for a given travel mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteResult {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    /// Encoded overview polyline, when the provider returns one
    pub polyline: Option<String>,
}

impl RouteResult {
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_meters as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(city: Option<&str>, country: Option<&str>) -> GeocodeResult {
        GeocodeResult {
            latitude: 1.3,
            longitude: 103.8,
            formatted_address: "somewhere".to_string(),
            city: city.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    #[test]
    fn test_same_city_is_case_insensitive() {
        let a = place(Some("Singapore"), Some("Singapore"));
        let b = place(Some(" singapore "), Some("SINGAPORE"));
        assert!(a.same_city_as(&b));
        assert!(a.same_country_as(&b));
    }

    #[test]
    fn test_same_city_folds_non_ascii_case() {
        let a = place(Some("Malmö"), Some("Sverige"));
        let b = place(Some("MALMÖ"), Some("SVERIGE"));
        assert!(a.same_city_as(&b));
        assert!(!a.same_city_as(&place(Some("Malmo"), Some("Sverige"))));
    }

    #[test]
    fn test_unknown_city_never_matches() {
        let a = place(None, Some("France"));
        let b = place(None, Some("France"));
        assert!(!a.same_city_as(&b));
        assert!(a.same_country_as(&b));
    }

    #[test]
    fn test_distance_km_to() {
        let berlin = Coordinates::new(52.52, 13.405);
        let munich = Coordinates::new(48.137, 11.575);
        let d = berlin.distance_km_to(&munich);
        assert!((d - 504.0).abs() < 10.0, "unexpected distance {d}");
    }

    #[test]
    fn test_route_distance_km() {
        let route = RouteResult {
            distance_meters: 12_500,
            duration_seconds: 900,
            polyline: None,
        };
        assert_eq!(route.distance_km(), 12.5);
    }
}

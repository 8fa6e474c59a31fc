//! Geography rules rejecting transport modes that cannot have been used
//!
//! Every mode maps to a list of plain rule functions. A rule either passes
//! or returns the reason shown to the user. Rules are evaluated in order and
//! the first rejection wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::TripError;
use crate::models::{GeocodeResult, TransportMode};

/// Below this no flight is plausible anywhere
const MIN_FLIGHT_KM: f64 = 50.0;
/// Neighbouring metro areas are reachable overland below this
const ADJACENT_CITY_MIN_FLIGHT_KM: f64 = 300.0;
/// Crossings shorter than this are served by bridges or tunnels
const MIN_SHIP_KM: f64 = 10.0;

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct TripContext<'a> {
    pub origin: &'a GeocodeResult,
    pub destination: &'a GeocodeResult,
    /// Routed distance
    pub distance_km: f64,
    /// Great-circle distance between the two points
    pub straight_line_km: f64,
}

impl<'a> TripContext<'a> {
    #[must_use]
    pub fn new(origin: &'a GeocodeResult, destination: &'a GeocodeResult, distance_km: f64) -> Self {
        Self {
            origin,
            destination,
            distance_km,
            straight_line_km: origin.coordinates().distance_km_to(&destination.coordinates()),
        }
    }

    fn same_country(&self) -> bool {
        self.origin.same_country_as(self.destination)
    }
}

pub type Rule = fn(&TripContext<'_>) -> Result<(), String>;

/// Domestic flight threshold buckets. Small countries have no domestic air travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountrySize {
    Small,
    Medium,
    Large,
}

const SMALL_COUNTRIES: &[&str] = &[
    "singapore",
    "luxembourg",
    "monaco",
    "brunei",
    "bahrain",
    "malta",
    "andorra",
    "liechtenstein",
    "san marino",
    "vatican city",
    "hong kong",
    "macau",
    "macao",
    "qatar",
    "belgium",
    "netherlands",
    "switzerland",
    "israel",
    "slovenia",
];

const LARGE_COUNTRIES: &[&str] = &[
    "united states",
    "usa",
    "china",
    "russia",
    "canada",
    "australia",
    "brazil",
    "india",
    "indonesia",
    "argentina",
    "kazakhstan",
    "mexico",
    "japan",
];

impl CountrySize {
    /// Unknown countries are treated as medium
    #[must_use]
    pub fn of(country: Option<&str>) -> Self {
        let Some(country) = country else {
            return CountrySize::Medium;
        };
        let country = country.trim().to_lowercase();
        if SMALL_COUNTRIES.contains(&country.as_str()) {
            CountrySize::Small
        } else if LARGE_COUNTRIES.contains(&country.as_str()) {
            CountrySize::Large
        } else {
            CountrySize::Medium
        }
    }

    /// Shortest domestic flight considered plausible
    #[must_use]
    pub fn min_domestic_flight_km(self) -> f64 {
        match self {
            CountrySize::Small => 1000.0,
            CountrySize::Medium => 300.0,
            CountrySize::Large => 150.0,
        }
    }
}

// Major city pairs close enough to be connected by road or rail
const ADJACENT_CITY_PAIRS: &[(&str, &str)] = &[
    ("singapore", "johor bahru"),
    ("hong kong", "shenzhen"),
    ("macau", "zhuhai"),
    ("copenhagen", "malmö"),
    ("vienna", "bratislava"),
    ("detroit", "windsor"),
    ("san diego", "tijuana"),
    ("basel", "mulhouse"),
    ("geneva", "annecy"),
];

fn lowercase_city(place: &GeocodeResult) -> Option<String> {
    place.city.as_deref().map(|c| c.trim().to_lowercase())
}

fn is_adjacent_pair(a: &GeocodeResult, b: &GeocodeResult) -> bool {
    let (Some(a), Some(b)) = (lowercase_city(a), lowercase_city(b)) else {
        return false;
    };
    ADJACENT_CITY_PAIRS
        .iter()
        .any(|&(x, y)| (a == x && b == y) || (a == y && b == x))
}

fn positive_distance(ctx: &TripContext<'_>) -> Result<(), String> {
    if ctx.distance_km > 0.0 {
        Ok(())
    } else {
        Err("the trip distance must be greater than zero".to_string())
    }
}

fn plane_not_same_city(ctx: &TripContext<'_>) -> Result<(), String> {
    if ctx.origin.same_city_as(ctx.destination) {
        Err("origin and destination are in the same city".to_string())
    } else {
        Ok(())
    }
}

fn plane_minimum_distance(ctx: &TripContext<'_>) -> Result<(), String> {
    if ctx.distance_km < MIN_FLIGHT_KM {
        Err(format!(
            "{:.1} km is too short for a flight (minimum {MIN_FLIGHT_KM:.0} km)",
            ctx.distance_km
        ))
    } else {
        Ok(())
    }
}

fn plane_domestic_threshold(ctx: &TripContext<'_>) -> Result<(), String> {
    if !ctx.same_country() {
        return Ok(());
    }
    let size = CountrySize::of(ctx.origin.country.as_deref());
    let minimum = size.min_domestic_flight_km();
    if ctx.distance_km < minimum {
        Err(format!(
            "domestic flights within {} need at least {minimum:.0} km, this trip is {:.1} km",
            ctx.origin.country.as_deref().unwrap_or("this country"),
            ctx.distance_km
        ))
    } else {
        Ok(())
    }
}

fn plane_adjacent_cities(ctx: &TripContext<'_>) -> Result<(), String> {
    if is_adjacent_pair(ctx.origin, ctx.destination) && ctx.distance_km < ADJACENT_CITY_MIN_FLIGHT_KM
    {
        Err(format!(
            "{} and {} are neighbouring cities reachable overland",
            ctx.origin.city.as_deref().unwrap_or_default(),
            ctx.destination.city.as_deref().unwrap_or_default()
        ))
    } else {
        Ok(())
    }
}

fn ship_minimum_distance(ctx: &TripContext<'_>) -> Result<(), String> {
    if ctx.distance_km < MIN_SHIP_KM {
        Err(format!(
            "{:.1} km is too short for a ship crossing (minimum {MIN_SHIP_KM:.0} km)",
            ctx.distance_km
        ))
    } else {
        Ok(())
    }
}

fn subway_same_country(ctx: &TripContext<'_>) -> Result<(), String> {
    match (&ctx.origin.country, &ctx.destination.country) {
        (Some(_), Some(_)) if !ctx.same_country() => {
            Err("subway lines do not cross international borders".to_string())
        }
        _ => Ok(()),
    }
}

/// Immutable rule table keyed by transport mode
pub struct PlausibilityRules {
    universal: Vec<Rule>,
    by_mode: HashMap<TransportMode, Vec<Rule>>,
}

static STANDARD_RULES: LazyLock<PlausibilityRules> = LazyLock::new(|| {
    let mut by_mode: HashMap<TransportMode, Vec<Rule>> = HashMap::new();
    by_mode.insert(
        TransportMode::Plane,
        vec![
            plane_not_same_city as Rule,
            plane_minimum_distance,
            plane_domestic_threshold,
            plane_adjacent_cities,
        ],
    );
    by_mode.insert(TransportMode::Ship, vec![ship_minimum_distance as Rule]);
    by_mode.insert(TransportMode::Subway, vec![subway_same_country as Rule]);

    PlausibilityRules {
        universal: vec![positive_distance as Rule],
        by_mode,
    }
});

impl PlausibilityRules {
    /// The built-in rule table
    #[must_use]
    pub fn standard() -> &'static PlausibilityRules {
        &STANDARD_RULES
    }

    /// Mode-specific rules (empty for modes without geography checks)
    #[must_use]
    pub fn rules_for(&self, mode: TransportMode) -> &[Rule] {
        self.by_mode.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn check(&self, mode: TransportMode, ctx: &TripContext<'_>) -> Result<(), TripError> {
        self.universal
            .iter()
            .chain(self.rules_for(mode))
            .try_for_each(|rule| rule(ctx))
            .map_err(|reason| TripError::ImplausibleMode { mode, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn place(lat: f64, lon: f64, city: &str, country: &str) -> GeocodeResult {
        GeocodeResult {
            latitude: lat,
            longitude: lon,
            formatted_address: format!("{city}, {country}"),
            city: Some(city.to_string()),
            country: Some(country.to_string()),
        }
    }

    fn singapore() -> GeocodeResult {
        place(1.2903, 103.8520, "Singapore", "Singapore")
    }

    fn changi() -> GeocodeResult {
        place(1.3644, 103.9915, "Singapore", "Singapore")
    }

    fn johor_bahru() -> GeocodeResult {
        place(1.4927, 103.7414, "Johor Bahru", "Malaysia")
    }

    fn kuala_lumpur() -> GeocodeResult {
        place(3.1390, 101.6869, "Kuala Lumpur", "Malaysia")
    }

    fn penang() -> GeocodeResult {
        place(5.4141, 100.3288, "George Town", "Malaysia")
    }

    fn check(mode: TransportMode, a: &GeocodeResult, b: &GeocodeResult, km: f64) -> Result<(), TripError> {
        PlausibilityRules::standard().check(mode, &TripContext::new(a, b, km))
    }

    #[test]
    fn test_plane_rejects_same_city() {
        let err = check(TransportMode::Plane, &singapore(), &changi(), 20.0).unwrap_err();
        assert_eq!(
            err,
            TripError::ImplausibleMode {
                mode: TransportMode::Plane,
                reason: "origin and destination are in the same city".to_string(),
            }
        );
    }

    #[test]
    fn test_plane_rejects_short_domestic_hop() {
        // Kuala Lumpur to George Town by road is ~355 km, fine for a medium country
        assert!(check(TransportMode::Plane, &kuala_lumpur(), &penang(), 355.0).is_ok());
        assert!(check(TransportMode::Plane, &kuala_lumpur(), &penang(), 250.0).is_err());
    }

    #[test]
    fn test_plane_rejects_adjacent_cities() {
        let err = check(TransportMode::Plane, &johor_bahru(), &singapore(), 60.0).unwrap_err();
        assert!(matches!(err, TripError::ImplausibleMode { ref reason, .. } if reason.contains("neighbouring")));
    }

    #[test]
    fn test_plane_rejects_tiny_international_hop() {
        let basel = place(47.5596, 7.5886, "Basel", "Switzerland");
        let weil = place(47.5947, 7.6108, "Weil am Rhein", "Germany");
        assert!(check(TransportMode::Plane, &basel, &weil, 8.0).is_err());
    }

    #[test]
    fn test_plane_passes_international_flight() {
        assert!(check(TransportMode::Plane, &singapore(), &kuala_lumpur(), 350.0).is_ok());
    }

    #[test]
    fn test_ship_needs_minimum_crossing() {
        assert!(check(TransportMode::Ship, &singapore(), &johor_bahru(), 4.0).is_err());
        assert!(check(TransportMode::Ship, &singapore(), &johor_bahru(), 25.0).is_ok());
    }

    #[test]
    fn test_subway_rejects_cross_border() {
        let err = check(TransportMode::Subway, &singapore(), &johor_bahru(), 30.0).unwrap_err();
        assert!(matches!(err, TripError::ImplausibleMode { mode: TransportMode::Subway, .. }));
    }

    #[test]
    fn test_subway_allows_unknown_country() {
        let mut unknown = johor_bahru();
        unknown.country = None;
        assert!(check(TransportMode::Subway, &singapore(), &unknown, 30.0).is_ok());
    }

    #[rstest]
    #[case(TransportMode::Walking)]
    #[case(TransportMode::Bicycle)]
    #[case(TransportMode::ElectricBike)]
    #[case(TransportMode::Subway)]
    #[case(TransportMode::Bus)]
    #[case(TransportMode::CarGasoline)]
    #[case(TransportMode::CarElectric)]
    #[case(TransportMode::Ship)]
    #[case(TransportMode::Plane)]
    fn test_every_mode_passes_a_long_international_trip(#[case] mode: TransportMode) {
        let tokyo = place(35.6762, 139.6503, "Tokyo", "Japan");
        let result = if mode == TransportMode::Subway {
            check(mode, &kuala_lumpur(), &penang(), 1200.0)
        } else {
            check(mode, &singapore(), &tokyo, 5300.0)
        };
        assert!(result.is_ok(), "{mode} was rejected: {result:?}");
    }

    #[rstest]
    #[case(TransportMode::Bus)]
    #[case(TransportMode::Walking)]
    fn test_zero_distance_is_rejected(#[case] mode: TransportMode) {
        assert!(check(mode, &singapore(), &changi(), 0.0).is_err());
    }

    #[rstest]
    #[case(Some("Singapore"), CountrySize::Small)]
    #[case(Some(" united states "), CountrySize::Large)]
    #[case(Some("Malaysia"), CountrySize::Medium)]
    #[case(None, CountrySize::Medium)]
    fn test_country_size(#[case] country: Option<&str>, #[case] expected: CountrySize) {
        assert_eq!(CountrySize::of(country), expected);
    }

    #[test]
    fn test_modes_without_geography_rules() {
        let rules = PlausibilityRules::standard();
        assert!(rules.rules_for(TransportMode::Bus).is_empty());
        assert_eq!(rules.rules_for(TransportMode::Plane).len(), 4);
    }
}

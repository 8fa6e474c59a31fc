//! End-to-end tests of trip pricing and factor resolution through the public API

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use carbontrail::factors::{
    CarbonFactorResolver, Estimate, EstimationApi, EstimationTier, InMemoryProductStore,
    ProductDatabase, ProductInfo, multiplier_for_tags,
};
use carbontrail::geocoding::{GeocodingProvider, InMemoryGeocodingCache};
use carbontrail::models::Coordinates;
use carbontrail::travel::{InMemoryTransportFactors, InMemoryTravelLog};
use carbontrail::{
    Endpoint, FactorKey, GeocodeResult, Provenance, RouteResult, TransportMode, TripError,
    TripPricer, TripRequest,
};

/// Fixed gazetteer with a fixed route length
struct FakeMaps {
    places: HashMap<&'static str, GeocodeResult>,
    route_meters: u64,
    geocode_calls: AtomicUsize,
}

impl FakeMaps {
    fn new(route_meters: u64) -> Self {
        let mut places = HashMap::new();
        for (name, lat, lon, city, country) in [
            ("NUS", 1.2966, 103.7764, "Singapore", "Singapore"),
            ("Changi Airport", 1.3644, 103.9915, "Singapore", "Singapore"),
            ("Johor Bahru", 1.4927, 103.7414, "Johor Bahru", "Malaysia"),
            ("Tokyo", 35.6762, 139.6503, "Tokyo", "Japan"),
        ] {
            places.insert(
                name,
                GeocodeResult {
                    latitude: lat,
                    longitude: lon,
                    formatted_address: name.to_string(),
                    city: Some(city.to_string()),
                    country: Some(country.to_string()),
                },
            );
        }
        Self {
            places,
            route_meters,
            geocode_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GeocodingProvider for FakeMaps {
    async fn geocode(&self, address: &str) -> carbontrail::Result<Option<GeocodeResult>> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.places.get(address).cloned())
    }

    async fn route(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
        _mode: TransportMode,
    ) -> carbontrail::Result<Option<RouteResult>> {
        Ok(Some(RouteResult {
            distance_meters: self.route_meters,
            duration_seconds: 1800,
            polyline: None,
        }))
    }
}

fn pricer(maps: Arc<FakeMaps>, factors: InMemoryTransportFactors) -> TripPricer {
    TripPricer::new(maps, Arc::new(InMemoryGeocodingCache::new()), Arc::new(factors))
}

#[tokio::test]
async fn test_bus_ten_km_at_point_one_is_one_kg() {
    let factors = InMemoryTransportFactors::empty();
    factors.set(TransportMode::Bus, 0.1).await;
    let recorder = Arc::new(InMemoryTravelLog::new());
    let pricer = pricer(Arc::new(FakeMaps::new(10_000)), factors).with_recorder(recorder.clone());

    let estimate = pricer
        .price_trip(&TripRequest::new("NUS", "Changi Airport", TransportMode::Bus))
        .await
        .unwrap();

    assert!((estimate.distance_km - 10.0).abs() < 1e-9);
    assert!((estimate.emission_kg - 1.0).abs() < 1e-9);
    assert_eq!(recorder.entries().await.len(), 1);
}

#[tokio::test]
async fn test_taxi_always_fails() {
    let maps = Arc::new(FakeMaps::new(10_000));
    let pricer = pricer(maps.clone(), InMemoryTransportFactors::with_defaults());

    for (from, to) in [("NUS", "Changi Airport"), ("Atlantis", ""), ("Tokyo", "Johor Bahru")] {
        let err = pricer
            .price_trip(&TripRequest::new(from, to, TransportMode::Taxi))
            .await
            .unwrap_err();
        assert_eq!(err, TripError::UnsupportedMode { mode: TransportMode::Taxi });
    }
    assert_eq!(maps.geocode_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_plane_same_city_is_implausible() {
    let pricer = pricer(Arc::new(FakeMaps::new(25_000)), InMemoryTransportFactors::with_defaults());
    let err = pricer
        .preview_trip(&TripRequest::new("NUS", "Changi Airport", TransportMode::Plane))
        .await
        .unwrap_err();

    assert!(matches!(err, TripError::ImplausibleMode { mode: TransportMode::Plane, .. }));
    assert!(err.to_string().starts_with("Plane is not plausible for this trip"));
}

#[tokio::test]
async fn test_subway_across_border_is_implausible() {
    let pricer = pricer(Arc::new(FakeMaps::new(30_000)), InMemoryTransportFactors::with_defaults());
    let err = pricer
        .preview_trip(&TripRequest::new("NUS", "Johor Bahru", TransportMode::Subway))
        .await
        .unwrap_err();

    assert!(matches!(err, TripError::ImplausibleMode { mode: TransportMode::Subway, .. }));
}

#[tokio::test]
async fn test_long_haul_flight_is_priced() {
    let pricer = pricer(Arc::new(FakeMaps::new(5_300_000)), InMemoryTransportFactors::with_defaults());
    let estimate = pricer
        .preview_trip(&TripRequest::new("NUS", "Tokyo", TransportMode::Plane))
        .await
        .unwrap();

    assert!((estimate.emission_kg - 5300.0 * 0.25).abs() < 1e-6);
    assert!(estimate.straight_line_km > 5000.0);
}

#[tokio::test]
async fn test_walking_and_cycling_are_free() {
    let factors = InMemoryTransportFactors::empty();
    factors.set(TransportMode::Walking, 3.0).await;
    let pricer = pricer(Arc::new(FakeMaps::new(12_000)), factors);

    for mode in [TransportMode::Walking, TransportMode::Bicycle] {
        let estimate = pricer
            .preview_trip(&TripRequest::new("NUS", "Changi Airport", mode))
            .await
            .unwrap();
        assert_eq!(estimate.emission_kg, 0.0);
    }
}

#[tokio::test]
async fn test_unknown_destination_names_the_side() {
    let pricer = pricer(Arc::new(FakeMaps::new(10_000)), InMemoryTransportFactors::with_defaults());
    let err = pricer
        .preview_trip(&TripRequest::new("NUS", "Atlantis", TransportMode::Bus))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TripError::GeocodeFailed {
            side: Endpoint::Destination,
            address: "Atlantis".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "destination address could not be geocoded: Atlantis"
    );
}

/// Product database with a single product
struct FakeProducts {
    product: ProductInfo,
    calls: AtomicUsize,
}

#[async_trait]
impl ProductDatabase for FakeProducts {
    async fn lookup_by_barcode(&self, barcode: &str) -> carbontrail::Result<Option<ProductInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((barcode == "5000112548167").then(|| self.product.clone()))
    }
}

struct FakeEstimation {
    co2e: f64,
    calls: AtomicUsize,
}

#[async_trait]
impl EstimationApi for FakeEstimation {
    async fn estimate(
        &self,
        _activity_id: &str,
        _quantity: f64,
        unit: &str,
        _region: &str,
    ) -> carbontrail::Result<Option<Estimate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Estimate {
            co2e: self.co2e,
            unit: unit.to_string(),
        }))
    }
}

fn cascade(
    direct: Option<f64>,
) -> (CarbonFactorResolver, Arc<FakeProducts>, Arc<FakeEstimation>) {
    let products = Arc::new(FakeProducts {
        product: ProductInfo {
            name: "Cola".to_string(),
            category_tags: vec!["en:beverages".to_string(), "en:sodas".to_string()],
            brand: Some("Fizz".to_string()),
            direct_co2_total: direct,
        },
        calls: AtomicUsize::new(0),
    });
    let estimation = Arc::new(FakeEstimation {
        co2e: 2.0,
        calls: AtomicUsize::new(0),
    });
    let database: Arc<dyn ProductDatabase> = products.clone();
    let resolver = CarbonFactorResolver::standard(
        Arc::new(InMemoryProductStore::new()),
        Some(database),
        Some(EstimationTier::new(estimation.clone(), "food", "GB")),
    );
    (resolver, products, estimation)
}

#[tokio::test]
async fn test_repeated_resolution_is_idempotent() {
    let (resolver, products, estimation) = cascade(None);
    let key = FactorKey::barcode("5000112548167");

    let first = resolver.lookup(&key, false).await;
    let second = resolver.lookup(&key, false).await;

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(products.calls.load(Ordering::SeqCst), 1);
    assert_eq!(estimation.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.factor.provenance, Provenance::EstimationApi);
    assert!((first.factor.factor - 2.0 * 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn test_direct_figure_wins_over_estimation() {
    let (resolver, _, estimation) = cascade(Some(0.35));
    let factor = resolver
        .resolve(&FactorKey::barcode("5000112548167"), false)
        .await;

    assert_eq!(factor.provenance, Provenance::OpenProductDatabase);
    assert_eq!(factor.factor, 0.35);
    assert_eq!(estimation.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_dual_defaults() {
    let (resolver, _, _) = cascade(None);

    let label = resolver.resolve(&FactorKey::label("mystery casserole"), false).await;
    assert_eq!(label.provenance, Provenance::Default);
    assert_eq!(label.factor, 1.0);

    let barcode = resolver.resolve(&FactorKey::barcode("0000000000017"), false).await;
    assert_eq!(barcode.provenance, Provenance::Default);
    assert_eq!(barcode.factor, 0.5);
}

#[tokio::test]
async fn test_catalog_label_is_case_insensitive() {
    let (resolver, products, _) = cascade(None);
    let factor = resolver.resolve(&FactorKey::label("hainanese chicken rice"), false).await;

    assert_eq!(factor.provenance, Provenance::LocalCatalog);
    assert_eq!(factor.factor, 1.10);
    assert_eq!(products.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_multiplier_table() {
    assert_eq!(multiplier_for_tags(&["en:beef"]), 7.3);
    assert_eq!(multiplier_for_tags(&["en:dairy-products"]), 0.8);
    assert_eq!(multiplier_for_tags(&["en:chocolate"]), 5.1);
    assert_eq!(multiplier_for_tags(&["en:fruit-and-vegetables"]), 0.2);
}

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::emission::TravelEmissionCalculator;
use super::factors::TransportFactorSource;
use super::log::{TravelLog, TravelLogRecorder};
use super::plausibility::{PlausibilityRules, TripContext};
use crate::error::{Endpoint, TripError};
use crate::geocoding::{GeocodingCache, GeocodingProvider};
use crate::models::{GeocodeResult, TransportMode};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub mode: TransportMode,
}

impl TripRequest {
    #[must_use]
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, mode: TransportMode) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            mode,
        }
    }
}

/// A validated and priced trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripEstimate {
    pub origin: GeocodeResult,
    pub destination: GeocodeResult,
    pub mode: TransportMode,
    pub distance_km: f64,
    pub straight_line_km: f64,
    pub duration_seconds: u64,
    pub emission_kg: f64,
    pub polyline: Option<String>,
}

/// Validates a claimed trip and computes its emissions
pub struct TripPricer {
    provider: Arc<dyn GeocodingProvider>,
    cache: Arc<dyn GeocodingCache>,
    factors: Arc<dyn TransportFactorSource>,
    rules: &'static PlausibilityRules,
    recorder: Option<Arc<dyn TravelLogRecorder>>,
}

impl TripPricer {
    pub fn new(
        provider: Arc<dyn GeocodingProvider>,
        cache: Arc<dyn GeocodingCache>,
        factors: Arc<dyn TransportFactorSource>,
    ) -> Self {
        Self {
            provider,
            cache,
            factors,
            rules: PlausibilityRules::standard(),
            recorder: None,
        }
    }

    /// Priced trips are handed to `recorder`; previews never are
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn TravelLogRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Price a trip and record it
    #[instrument(skip(self), fields(mode = %request.mode))]
    pub async fn price_trip(&self, request: &TripRequest) -> Result<TripEstimate, TripError> {
        let estimate = self.estimate(request).await?;

        if let Some(recorder) = &self.recorder {
            let log = TravelLog::from_estimate(&estimate, Utc::now());
            if let Err(e) = recorder.record(log).await {
                error!("Failed to record travel log: {e}");
            }
        }

        info!(
            distance_km = estimate.distance_km,
            emission_kg = estimate.emission_kg,
            "Trip priced"
        );
        Ok(estimate)
    }

    /// Same computation as [`Self::price_trip`] without recording anything
    #[instrument(skip(self), fields(mode = %request.mode))]
    pub async fn preview_trip(&self, request: &TripRequest) -> Result<TripEstimate, TripError> {
        self.estimate(request).await
    }

    async fn estimate(&self, request: &TripRequest) -> Result<TripEstimate, TripError> {
        let mode = request.mode;
        if mode.is_logging_disabled() {
            return Err(TripError::UnsupportedMode { mode });
        }

        let (origin, destination) = tokio::join!(
            self.resolve_address(Endpoint::Origin, &request.origin),
            self.resolve_address(Endpoint::Destination, &request.destination),
        );
        let (origin, destination) = (origin?, destination?);

        let route = match self
            .provider
            .route(origin.coordinates(), destination.coordinates(), mode)
            .await
        {
            Ok(Some(route)) => route,
            Ok(None) => return Err(TripError::NoRouteFound),
            Err(e) => {
                warn!("Route lookup failed: {e}");
                return Err(TripError::NoRouteFound);
            }
        };

        let distance_km = route.distance_km();
        let context = TripContext::new(&origin, &destination, distance_km);
        self.rules.check(mode, &context)?;
        let straight_line_km = context.straight_line_km;

        let emission_kg = if mode.is_zero_emission() {
            0.0
        } else {
            let factor = match self.factors.factor_for(mode).await {
                Ok(Some(factor)) => factor,
                Ok(None) => return Err(TripError::FactorNotFound { mode }),
                Err(e) => {
                    warn!("Transport factor lookup failed: {e}");
                    return Err(TripError::FactorNotFound { mode });
                }
            };
            TravelEmissionCalculator::emission_kg(mode, distance_km, Some(&factor))
        };

        Ok(TripEstimate {
            origin,
            destination,
            mode,
            distance_km,
            straight_line_km,
            duration_seconds: route.duration_seconds,
            emission_kg,
            polyline: route.polyline,
        })
    }

    /// Cache first, provider on miss. Cache failures count as a miss.
    async fn resolve_address(&self, side: Endpoint, address: &str) -> Result<GeocodeResult, TripError> {
        let failed = || TripError::GeocodeFailed {
            side,
            address: address.to_string(),
        };
        if address.trim().is_empty() {
            return Err(failed());
        }

        match self.cache.get(address).await {
            Ok(Some(hit)) => {
                debug!(%side, "Geocode cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => warn!(%side, "Geocode cache read failed: {e}"),
        }

        let result = match self.provider.geocode(address).await {
            Ok(Some(result)) => result,
            Ok(None) => return Err(failed()),
            Err(e) => {
                warn!(%side, "Geocoding failed: {e}");
                return Err(failed());
            }
        };

        if let Err(e) = self.cache.put(address, &result).await {
            warn!(%side, "Geocode cache write failed: {e}");
        }
        Ok(result)
    }
}

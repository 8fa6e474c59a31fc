//! Travel leg validation and pricing
//!
//! A trip flows through [`TripPricer`]: both addresses are geocoded, a route
//! is requested, the [`PlausibilityRules`] for the claimed mode are checked
//! and the route distance is multiplied with the mode's per-km factor.

pub mod emission;
pub mod factors;
pub mod log;
pub mod plausibility;
pub mod pricing;

pub use emission::TravelEmissionCalculator;
pub use factors::{InMemoryTransportFactors, TransportFactorSource};
pub use log::{
    InMemoryTravelLog, ModeStatistics, PersistentTravelLog, TravelLog, TravelLogRecorder, TravelReport,
    TravelStatistics, TripSummary, format_duration,
};
pub use plausibility::{CountrySize, PlausibilityRules, TripContext};
pub use pricing::{TripEstimate, TripPricer, TripRequest};

//! Transport modes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CarbonError;

/// Closed set of transport modes a trip can be claimed with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Walking,
    Bicycle,
    ElectricBike,
    Subway,
    Bus,
    CarGasoline,
    CarElectric,
    Ship,
    Plane,
    Taxi,
}

impl TransportMode {
    pub const ALL: [TransportMode; 10] = [
        TransportMode::Walking,
        TransportMode::Bicycle,
        TransportMode::ElectricBike,
        TransportMode::Subway,
        TransportMode::Bus,
        TransportMode::CarGasoline,
        TransportMode::CarElectric,
        TransportMode::Ship,
        TransportMode::Plane,
        TransportMode::Taxi,
    ];

    /// Label under which the mode's factor is stored (category Transport)
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Walking => "Walking",
            TransportMode::Bicycle => "Bicycle",
            TransportMode::ElectricBike => "ElectricBike",
            TransportMode::Subway => "Subway",
            TransportMode::Bus => "Bus",
            TransportMode::CarGasoline => "CarGasoline",
            TransportMode::CarElectric => "CarElectric",
            TransportMode::Ship => "Ship",
            TransportMode::Plane => "Plane",
            TransportMode::Taxi => "Taxi",
        }
    }

    /// Routing profile understood by the directions provider.
    /// Planes and ships have no dedicated profile and fall back to driving.
    #[must_use]
    pub fn routing_profile(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Bicycle | TransportMode::ElectricBike => "bicycling",
            TransportMode::Subway | TransportMode::Bus => "transit",
            TransportMode::CarGasoline
            | TransportMode::CarElectric
            | TransportMode::Taxi
            | TransportMode::Ship
            | TransportMode::Plane => "driving",
        }
    }

    /// Human-powered modes are always priced at zero emission
    #[must_use]
    pub fn is_zero_emission(&self) -> bool {
        matches!(self, TransportMode::Walking | TransportMode::Bicycle)
    }

    /// Taxi is permanently excluded from emission logging
    #[must_use]
    pub fn is_logging_disabled(&self) -> bool {
        matches!(self, TransportMode::Taxi)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransportMode {
    type Err = CarbonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();

        match wanted.to_ascii_lowercase().as_str() {
            "walk" | "walking" => Ok(TransportMode::Walking),
            "bike" | "bicycle" => Ok(TransportMode::Bicycle),
            "ebike" | "electricbike" => Ok(TransportMode::ElectricBike),
            "subway" | "metro" | "mrt" => Ok(TransportMode::Subway),
            "bus" => Ok(TransportMode::Bus),
            "car" | "cargasoline" => Ok(TransportMode::CarGasoline),
            "ev" | "carelectric" => Ok(TransportMode::CarElectric),
            "ship" | "ferry" => Ok(TransportMode::Ship),
            "plane" | "flight" => Ok(TransportMode::Plane),
            "taxi" => Ok(TransportMode::Taxi),
            _ => Err(CarbonError::validation(format!(
                "Unknown transport mode '{s}'"
            ))),
        }
    }
}

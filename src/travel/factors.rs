use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::models::{CarbonCategory, CarbonFactor, Provenance, TransportMode};

pub const TRANSPORT_UNIT: &str = "kgCO2/km";

/// Reads the per-km factor stored for `(category = Transport, label = mode)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransportFactorSource: Send + Sync {
    async fn factor_for(&self, mode: TransportMode) -> Result<Option<CarbonFactor>>;
}

/// Seeded per-km factors, kg CO2 per passenger km
const DEFAULT_FACTORS: &[(TransportMode, f64)] = &[
    (TransportMode::CarGasoline, 0.21),
    (TransportMode::Taxi, 0.20),
    (TransportMode::Subway, 0.03),
    (TransportMode::Bus, 0.05),
    (TransportMode::Ship, 0.03),
    (TransportMode::ElectricBike, 0.02),
    (TransportMode::CarElectric, 0.05),
    (TransportMode::Plane, 0.25),
    (TransportMode::Walking, 0.0),
    (TransportMode::Bicycle, 0.0),
];

#[must_use]
pub fn transport_factor(mode: TransportMode, value: f64) -> CarbonFactor {
    CarbonFactor::new(
        mode.label(),
        CarbonCategory::Transport,
        value,
        TRANSPORT_UNIT,
        Provenance::LocalCatalog,
    )
}

pub struct InMemoryTransportFactors {
    factors: RwLock<HashMap<TransportMode, CarbonFactor>>,
}

impl InMemoryTransportFactors {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factors: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        let factors = DEFAULT_FACTORS
            .iter()
            .map(|&(mode, value)| (mode, transport_factor(mode, value)))
            .collect();
        Self {
            factors: RwLock::new(factors),
        }
    }

    pub async fn set(&self, mode: TransportMode, value: f64) {
        self.factors
            .write()
            .await
            .insert(mode, transport_factor(mode, value));
    }

    pub async fn remove(&self, mode: TransportMode) {
        self.factors.write().await.remove(&mode);
    }
}

#[async_trait]
impl TransportFactorSource for InMemoryTransportFactors {
    async fn factor_for(&self, mode: TransportMode) -> Result<Option<CarbonFactor>> {
        Ok(self.factors.read().await.get(&mode).cloned())
    }
}

use crate::models::{CarbonFactor, TransportMode};

/// Turns a validated distance into kg CO2e
pub struct TravelEmissionCalculator;

impl TravelEmissionCalculator {
    /// Walking and cycling are always zero, whatever factor is configured
    #[must_use]
    pub fn emission_kg(mode: TransportMode, distance_km: f64, factor: Option<&CarbonFactor>) -> f64 {
        if mode.is_zero_emission() {
            return 0.0;
        }
        factor.map_or(0.0, |f| distance_km * f.factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CarbonCategory, Provenance};

    fn per_km(mode: TransportMode, value: f64) -> CarbonFactor {
        CarbonFactor::new(
            mode.label(),
            CarbonCategory::Transport,
            value,
            "kgCO2/km",
            Provenance::Default,
        )
    }

    #[test]
    fn test_bus_ten_km() {
        let factor = per_km(TransportMode::Bus, 0.1);
        let kg = TravelEmissionCalculator::emission_kg(TransportMode::Bus, 10.0, Some(&factor));
        assert!((kg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_emission_modes_ignore_factor() {
        let factor = per_km(TransportMode::Walking, 5.0);
        for mode in [TransportMode::Walking, TransportMode::Bicycle] {
            assert_eq!(
                TravelEmissionCalculator::emission_kg(mode, 42.0, Some(&factor)),
                0.0
            );
        }
    }
}

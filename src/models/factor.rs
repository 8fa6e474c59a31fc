//! Carbon factors and the product records that own them

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad category a factor belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CarbonCategory {
    Food,
    Transport,
}

/// Which resolution tier produced a factor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Provenance {
    Default,
    OpenProductDatabase,
    EstimationApi,
    LocalCatalog,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provenance::Default => "Default",
            Provenance::OpenProductDatabase => "OpenProductDatabase",
            Provenance::EstimationApi => "EstimationApi",
            Provenance::LocalCatalog => "LocalCatalog",
        };
        f.write_str(name)
    }
}

/// An emission factor. `factor` is never negative and `unit` is always set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarbonFactor {
    pub label: String,
    pub category: CarbonCategory,
    pub factor: f64,
    pub unit: String,
    pub provenance: Provenance,
    pub region: Option<String>,
    /// Estimation activity the factor was derived from, if any
    pub activity_id: Option<String>,
}

impl CarbonFactor {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        category: CarbonCategory,
        factor: f64,
        unit: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            label: label.into(),
            category,
            factor,
            unit: unit.into(),
            provenance,
            region: None,
            activity_id: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_activity_id(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }
}

/// What a factor is being resolved for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FactorKey {
    Barcode(String),
    Label(String),
}

impl FactorKey {
    /// Barcode key; surrounding whitespace is dropped
    #[must_use]
    pub fn barcode(code: &str) -> Self {
        FactorKey::Barcode(code.trim().to_string())
    }

    /// Free-text label key; surrounding whitespace is dropped
    #[must_use]
    pub fn label(text: &str) -> Self {
        FactorKey::Label(text.trim().to_string())
    }

    /// Canonical key under which the resolved record is stored
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            FactorKey::Barcode(code) => format!("barcode:{code}"),
            FactorKey::Label(text) => format!("label:{}", text.to_lowercase()),
        }
    }

    #[must_use]
    pub fn as_barcode(&self) -> Option<&str> {
        match self {
            FactorKey::Barcode(code) => Some(code),
            FactorKey::Label(_) => None,
        }
    }

    #[must_use]
    pub fn as_label(&self) -> Option<&str> {
        match self {
            FactorKey::Label(text) => Some(text),
            FactorKey::Barcode(_) => None,
        }
    }
}

impl fmt::Display for FactorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorKey::Barcode(code) => write!(f, "barcode {code}"),
            FactorKey::Label(text) => write!(f, "label '{text}'"),
        }
    }
}

/// Outcome of a resolution, keyed by barcode (or label). Owns its factor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub key: FactorKey,
    pub name: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub factor: CarbonFactor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys_separate_barcodes_from_labels() {
        let barcode = FactorKey::barcode(" 3017620422003 ");
        let label = FactorKey::label("Pad Thai");

        assert_eq!(barcode.storage_key(), "barcode:3017620422003");
        assert_eq!(label.storage_key(), "label:pad thai");
        assert_eq!(FactorKey::label("PAD THAI").storage_key(), label.storage_key());
    }

    #[test]
    fn test_factor_builders() {
        let factor = CarbonFactor::new(
            "Chocolate",
            CarbonCategory::Food,
            18.87,
            "kgCO2e/kg",
            Provenance::EstimationApi,
        )
        .with_region("GB")
        .with_activity_id("consumer_goods-type_food");

        assert_eq!(factor.region.as_deref(), Some("GB"));
        assert_eq!(factor.activity_id.as_deref(), Some("consumer_goods-type_food"));
        assert_eq!(factor.provenance.to_string(), "EstimationApi");
    }
}

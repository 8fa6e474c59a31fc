//! Fallback cascade resolving a carbon factor for a barcode or a dish label
//!
//! Tiers are tried in order until one produces a record: stored record,
//! local dish catalog, product database figure, estimation API scaled by a
//! category multiplier, fixed default. Resolution never fails; collaborator
//! errors are logged and the next tier is tried.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::catalog::{self, SERVING_UNIT};
use super::climatiq::EstimationApi;
use super::multipliers::{category_label_from_tags, multiplier_for_tags};
use super::open_food_facts::{ProductDatabase, ProductInfo};
use super::store::ProductStore;
use crate::models::{CarbonCategory, CarbonFactor, FactorKey, ProductRecord, Provenance};

pub const WEIGHT_UNIT: &str = "kgCO2e/kg";
pub const DEFAULT_BARCODE_FACTOR: f64 = 0.5;
pub const DEFAULT_LABEL_FACTOR: f64 = 1.0;
const UNKNOWN: &str = "Unknown";
const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// How a single lookup runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Ignore the stored record and resolve again
    pub force_refresh: bool,
    /// Never query remote sources. A key without a stored record gets the default.
    pub use_default: bool,
}

impl LookupOptions {
    #[must_use]
    pub fn refresh(force_refresh: bool) -> Self {
        Self {
            force_refresh,
            ..Self::default()
        }
    }
}

/// State shared by the tiers of one resolution
pub struct ResolutionContext {
    pub force_refresh: bool,
    pub use_default: bool,
    product: Option<Option<ProductInfo>>,
}

impl ResolutionContext {
    #[must_use]
    pub fn new(options: LookupOptions) -> Self {
        Self {
            force_refresh: options.force_refresh,
            use_default: options.use_default,
            product: None,
        }
    }

    /// The usable product fetched earlier in this resolution, if any
    #[must_use]
    pub fn product(&self) -> Option<&ProductInfo> {
        self.product.as_ref().and_then(Option::as_ref)
    }

    /// Fetch the product once per resolution. Failed and unusable lookups are remembered as `None`.
    pub async fn fetch_product(
        &mut self,
        database: &dyn ProductDatabase,
        barcode: &str,
    ) -> Option<&ProductInfo> {
        if self.product.is_none() {
            let fetched = match database.lookup_by_barcode(barcode).await {
                Ok(Some(info)) if info.is_usable() => Some(info),
                Ok(Some(_)) => {
                    debug!("Product database entry is incomplete");
                    None
                }
                Ok(None) => None,
                Err(e) => {
                    warn!("Product database lookup failed: {e}");
                    None
                }
            };
            self.product = Some(fetched);
        }
        self.product()
    }
}

/// One step of the cascade
#[async_trait]
pub trait ResolutionTier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Records from tiers that return `true` are upserted before being returned
    fn stores_result(&self) -> bool {
        true
    }

    /// Tiers that call out to remote services are skipped by default-only lookups
    fn queries_remote(&self) -> bool {
        false
    }

    async fn attempt(&self, key: &FactorKey, ctx: &mut ResolutionContext) -> Option<ProductRecord>;
}

fn food_factor(label: &str, factor: f64, unit: &str, provenance: Provenance) -> CarbonFactor {
    CarbonFactor::new(label, CarbonCategory::Food, factor, unit, provenance)
}

/// Previously resolved record, skipped on forced refresh
pub struct CachedTier {
    store: Arc<dyn ProductStore>,
}

impl CachedTier {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResolutionTier for CachedTier {
    fn name(&self) -> &'static str {
        "cached"
    }

    fn stores_result(&self) -> bool {
        false
    }

    async fn attempt(&self, key: &FactorKey, ctx: &mut ResolutionContext) -> Option<ProductRecord> {
        if ctx.force_refresh {
            return None;
        }
        match self.store.get(key).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Product store read failed: {e}");
                None
            }
        }
    }
}

/// Known dish labels
pub struct LocalCatalogTier;

#[async_trait]
impl ResolutionTier for LocalCatalogTier {
    fn name(&self) -> &'static str {
        "local catalog"
    }

    async fn attempt(&self, key: &FactorKey, _ctx: &mut ResolutionContext) -> Option<ProductRecord> {
        let label = key.as_label()?;
        let factor = catalog::lookup(label)?;
        Some(ProductRecord {
            key: key.clone(),
            name: label.to_string(),
            category: None,
            brand: None,
            factor: food_factor(label, factor, SERVING_UNIT, Provenance::LocalCatalog),
        })
    }
}

/// Life-cycle figure published by the product database
pub struct ProductDatabaseTier {
    database: Arc<dyn ProductDatabase>,
}

impl ProductDatabaseTier {
    pub fn new(database: Arc<dyn ProductDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl ResolutionTier for ProductDatabaseTier {
    fn name(&self) -> &'static str {
        "product database"
    }

    fn queries_remote(&self) -> bool {
        true
    }

    async fn attempt(&self, key: &FactorKey, ctx: &mut ResolutionContext) -> Option<ProductRecord> {
        let barcode = key.as_barcode()?;
        let product = ctx.fetch_product(self.database.as_ref(), barcode).await?;
        let co2 = product.direct_co2_total.filter(|v| v.is_finite() && *v >= 0.0)?;

        let category = category_label_from_tags(&product.category_tags);
        Some(ProductRecord {
            key: key.clone(),
            name: product.name.clone(),
            factor: food_factor(&category, co2, WEIGHT_UNIT, Provenance::OpenProductDatabase),
            category: Some(category),
            brand: product.brand.clone(),
        })
    }
}

/// Baseline food estimate scaled by the product's category multiplier
pub struct EstimationTier {
    api: Arc<dyn EstimationApi>,
    activity_id: String,
    region: String,
}

impl EstimationTier {
    pub fn new(api: Arc<dyn EstimationApi>, activity_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            api,
            activity_id: activity_id.into(),
            region: region.into(),
        }
    }
}

#[async_trait]
impl ResolutionTier for EstimationTier {
    fn name(&self) -> &'static str {
        "estimation"
    }

    fn queries_remote(&self) -> bool {
        true
    }

    async fn attempt(&self, key: &FactorKey, ctx: &mut ResolutionContext) -> Option<ProductRecord> {
        key.as_barcode()?;
        let product = ctx.product()?;
        if product
            .direct_co2_total
            .is_some_and(|v| v.is_finite() && v >= 0.0)
        {
            return None;
        }

        let estimate = match self
            .api
            .estimate(&self.activity_id, 1.0, "kg", &self.region)
            .await
        {
            Ok(Some(estimate)) if estimate.co2e > 0.0 => estimate,
            Ok(_) => return None,
            Err(e) => {
                warn!("Estimation API call failed: {e}");
                return None;
            }
        };

        let multiplier = multiplier_for_tags(&product.category_tags);
        let category = category_label_from_tags(&product.category_tags);
        debug!(co2e = estimate.co2e, multiplier, "Scaling baseline estimate");

        Some(ProductRecord {
            key: key.clone(),
            name: product.name.clone(),
            factor: food_factor(
                &category,
                estimate.co2e * multiplier,
                WEIGHT_UNIT,
                Provenance::EstimationApi,
            )
            .with_region(self.region.clone())
            .with_activity_id(self.activity_id.clone()),
            category: Some(category),
            brand: product.brand.clone(),
        })
    }
}

/// Always succeeds. Barcodes default lower than free-text labels.
pub struct DefaultTier;

impl DefaultTier {
    #[must_use]
    pub fn record_for(key: &FactorKey, product: Option<&ProductInfo>) -> ProductRecord {
        match key {
            FactorKey::Barcode(_) => ProductRecord {
                key: key.clone(),
                name: product.map_or_else(|| UNKNOWN_PRODUCT.to_string(), |p| p.name.clone()),
                category: Some(
                    product.map_or_else(|| UNKNOWN.to_string(), |p| category_label_from_tags(&p.category_tags)),
                ),
                brand: product.and_then(|p| p.brand.clone()),
                factor: food_factor(UNKNOWN, DEFAULT_BARCODE_FACTOR, WEIGHT_UNIT, Provenance::Default),
            },
            FactorKey::Label(label) => ProductRecord {
                key: key.clone(),
                name: label.clone(),
                category: None,
                brand: None,
                factor: food_factor(label, DEFAULT_LABEL_FACTOR, SERVING_UNIT, Provenance::Default),
            },
        }
    }
}

#[async_trait]
impl ResolutionTier for DefaultTier {
    fn name(&self) -> &'static str {
        "default"
    }

    async fn attempt(&self, key: &FactorKey, ctx: &mut ResolutionContext) -> Option<ProductRecord> {
        Some(Self::record_for(key, ctx.product()))
    }
}

pub struct CarbonFactorResolver {
    store: Arc<dyn ProductStore>,
    tiers: Vec<Box<dyn ResolutionTier>>,
}

impl CarbonFactorResolver {
    /// Resolver over an explicit tier list
    pub fn new(store: Arc<dyn ProductStore>, tiers: Vec<Box<dyn ResolutionTier>>) -> Self {
        Self { store, tiers }
    }

    /// The standard cascade. Missing collaborators drop their tier.
    pub fn standard(
        store: Arc<dyn ProductStore>,
        database: Option<Arc<dyn ProductDatabase>>,
        estimation: Option<EstimationTier>,
    ) -> Self {
        let mut tiers: Vec<Box<dyn ResolutionTier>> = vec![
            Box::new(CachedTier::new(store.clone())),
            Box::new(LocalCatalogTier),
        ];
        if let Some(database) = database {
            tiers.push(Box::new(ProductDatabaseTier::new(database)));
        }
        if let Some(estimation) = estimation {
            tiers.push(Box::new(estimation));
        }
        tiers.push(Box::new(DefaultTier));

        Self::new(store, tiers)
    }

    /// Names of the configured tiers, in evaluation order
    #[must_use]
    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    pub async fn resolve(&self, key: &FactorKey, force_refresh: bool) -> CarbonFactor {
        self.lookup(key, force_refresh).await.factor
    }

    pub async fn lookup(&self, key: &FactorKey, force_refresh: bool) -> ProductRecord {
        self.lookup_with(key, LookupOptions::refresh(force_refresh)).await
    }

    /// Resolve and return the whole record. The upsert is the last await, so
    /// dropping this future never leaves a partially written record.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn lookup_with(&self, key: &FactorKey, options: LookupOptions) -> ProductRecord {
        let mut ctx = ResolutionContext::new(options);

        for tier in &self.tiers {
            if ctx.use_default && tier.queries_remote() {
                debug!(tier = tier.name(), "Skipping remote tier");
                continue;
            }
            let Some(record) = tier.attempt(key, &mut ctx).await else {
                continue;
            };
            info!(
                tier = tier.name(),
                provenance = %record.factor.provenance,
                factor = record.factor.factor,
                "Carbon factor resolved"
            );
            if tier.stores_result() {
                self.store_record(&record).await;
            }
            return record;
        }

        let record = DefaultTier::record_for(key, ctx.product());
        self.store_record(&record).await;
        record
    }

    /// Resolve several keys concurrently, results in input order
    pub async fn lookup_all(&self, keys: &[FactorKey], options: LookupOptions) -> Vec<ProductRecord> {
        futures::future::join_all(keys.iter().map(|key| self.lookup_with(key, options))).await
    }

    async fn store_record(&self, record: &ProductRecord) {
        if let Err(e) = self.store.upsert(record).await {
            warn!("Failed to store product record: {e}");
        }
    }
}

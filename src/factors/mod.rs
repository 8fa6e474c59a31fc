//! Carbon factor resolution for consumer products and dishes
//!
//! - Catalog: fixed dish label table
//! - Multipliers: category tag severity table
//! - Open Food Facts and Climatiq: external data sources
//! - Store: resolved product records
//! - Resolver: the fallback cascade tying them together

pub mod catalog;
pub mod climatiq;
pub mod multipliers;
pub mod open_food_facts;
pub mod resolver;
pub mod store;

pub use climatiq::{ClimatiqClient, Estimate, EstimationApi};
pub use multipliers::{category_label_from_tags, multiplier_for_tags};
pub use open_food_facts::{OpenFoodFactsClient, ProductDatabase, ProductInfo};
pub use resolver::{
    CachedTier, CarbonFactorResolver, DefaultTier, EstimationTier, LocalCatalogTier, LookupOptions,
    ProductDatabaseTier, ResolutionContext, ResolutionTier,
};
pub use store::{InMemoryProductStore, PersistentProductStore, ProductStore};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};

use crate::Result;
use crate::config::ProductDatabaseConfig;
use crate::http::build_client;

const PRODUCT_FIELDS: &str = "product_name,categories_tags,brands,image_url,ecoscore_data";

/// What the product database knows about a barcode
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInfo {
    pub name: String,
    pub category_tags: Vec<String>,
    pub brand: Option<String>,
    /// Total kg CO2e per kg, when the database has a life-cycle figure
    pub direct_co2_total: Option<f64>,
}

impl ProductInfo {
    /// A product is only worth using with a real name and at least one category
    #[must_use]
    pub fn is_usable(&self) -> bool {
        let name = self.name.trim();
        !name.is_empty() && !name.eq_ignore_ascii_case("unknown") && !self.category_tags.is_empty()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductDatabase: Send + Sync {
    async fn lookup_by_barcode(&self, barcode: &str) -> Result<Option<ProductInfo>>;
}

/// Open Food Facts product API (no key needed)
pub struct OpenFoodFactsClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(config: &ProductDatabaseConfig) -> Result<Self> {
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            client: build_client(config.timeout_seconds, config.max_retries)?,
            base_url,
        })
    }
}

#[async_trait]
impl ProductDatabase for OpenFoodFactsClient {
    #[instrument(skip(self))]
    async fn lookup_by_barcode(&self, barcode: &str) -> Result<Option<ProductInfo>> {
        let url = format!(
            "{}{}?fields={PRODUCT_FIELDS}",
            self.base_url,
            urlencoding::encode(barcode)
        );

        debug!("Calling the product database");
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Barcode not in product database");
            return Ok(None);
        }

        let body: ProductResponse = response.error_for_status()?.json().await?;
        Ok(body.into_info())
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    categories_tags: Vec<String>,
    brands: Option<String>,
    #[serde(default, deserialize_with = "object_or_json_string")]
    ecoscore_data: Option<EcoScoreData>,
}

#[derive(Debug, Default, Deserialize)]
struct EcoScoreData {
    agribalyse: Option<Agribalyse>,
    agribalyse_co2_total: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Agribalyse {
    co2_total: Option<f64>,
}

// ecoscore_data arrives either as an object or as a JSON-encoded string
fn object_or_json_string<'de, D>(deserializer: D) -> std::result::Result<Option<EcoScoreData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match value {
        serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        serde_json::Value::String(text) if !text.trim().is_empty() => serde_json::from_str(&text).ok(),
        _ => None,
    };
    Ok(parsed)
}

impl ProductResponse {
    fn into_info(self) -> Option<ProductInfo> {
        if self.status != 1 {
            return None;
        }
        let product = self.product?;
        let direct_co2_total = product.ecoscore_data.and_then(|eco| {
            eco.agribalyse
                .and_then(|a| a.co2_total)
                .or(eco.agribalyse_co2_total)
        });

        Some(ProductInfo {
            name: product.product_name.unwrap_or_default(),
            category_tags: product.categories_tags,
            brand: product.brands.filter(|b| !b.trim().is_empty()),
            direct_co2_total,
        })
    }
}

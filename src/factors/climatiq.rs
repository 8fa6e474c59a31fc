use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::EstimationConfig;
use crate::http::build_client;
use crate::{CarbonError, Result};

/// Estimated emissions for a quantity of an activity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Estimate {
    pub co2e: f64,
    #[serde(rename = "co2e_unit", default)]
    pub unit: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EstimationApi: Send + Sync {
    async fn estimate(
        &self,
        activity_id: &str,
        quantity: f64,
        unit: &str,
        region: &str,
    ) -> Result<Option<Estimate>>;
}

/// Climatiq estimate endpoint
pub struct ClimatiqClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    data_version: String,
}

impl ClimatiqClient {
    pub fn new(config: &EstimationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| CarbonError::config("Estimation API key is not configured"))?;

        Ok(Self {
            client: build_client(config.timeout_seconds, config.max_retries)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            data_version: config.data_version.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct EstimateRequest<'a> {
    emission_factor: EmissionFactorSelector<'a>,
    parameters: WeightParameters<'a>,
}

#[derive(Debug, Serialize)]
struct EmissionFactorSelector<'a> {
    activity_id: &'a str,
    region: &'a str,
    data_version: &'a str,
}

#[derive(Debug, Serialize)]
struct WeightParameters<'a> {
    weight: f64,
    weight_unit: &'a str,
}

#[async_trait]
impl EstimationApi for ClimatiqClient {
    #[instrument(skip(self))]
    async fn estimate(
        &self,
        activity_id: &str,
        quantity: f64,
        unit: &str,
        region: &str,
    ) -> Result<Option<Estimate>> {
        let request = EstimateRequest {
            emission_factor: EmissionFactorSelector {
                activity_id,
                region,
                data_version: &self.data_version,
            },
            parameters: WeightParameters {
                weight: quantity,
                weight_unit: unit,
            },
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| CarbonError::api(format!("Failed to encode estimate request: {e}")))?;

        debug!("Calling the estimation API");
        let response = self
            .client
            .post(format!("{}/data/v1/estimate", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CarbonError::api(format!(
                "Estimation API error: {status} - {text}"
            )));
        }

        let estimate: Estimate = response.json().await?;
        Ok(Some(estimate))
    }
}

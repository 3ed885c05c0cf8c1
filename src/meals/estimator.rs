//! Free-text meal descriptions to calorie estimates (Nutritionix-compatible API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::EstimatorConfig;
use crate::provider::ProviderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(rename(deserialize = "food_name"))]
    pub name: String,
    #[serde(rename(deserialize = "nf_calories"), default)]
    pub calories: f64,
}

pub fn total_calories(items: &[FoodItem]) -> f64 {
    items.iter().map(|i| i.calories).sum()
}

#[async_trait]
pub trait NutritionEstimator: Send + Sync {
    async fn estimate(&self, description: &str) -> Result<Vec<FoodItem>, ProviderError>;
}

#[derive(Deserialize)]
struct NutrientsResponse {
    #[serde(default)]
    foods: Vec<FoodItem>,
}

#[derive(Clone)]
pub struct NutritionixClient {
    http: Client,
    base_url: String,
    app_id: String,
    app_key: String,
    timeout: Duration,
}

impl NutritionixClient {
    pub fn new(cfg: &EstimatorConfig, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            app_id: cfg.app_id.clone(),
            app_key: cfg.app_key.clone(),
            timeout,
        })
    }

    fn transport(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl NutritionEstimator for NutritionixClient {
    #[instrument(skip(self))]
    async fn estimate(&self, description: &str) -> Result<Vec<FoodItem>, ProviderError> {
        let res = self
            .http
            .post(format!("{}/v2/natural/nutrients", self.base_url))
            .header("x-app-id", &self.app_id)
            .header("x-app-key", &self.app_key)
            .json(&serde_json::json!({ "query": description }))
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = res.bytes().await.map_err(|e| self.transport(e))?;
        let parsed = decode_nutrients(&body)?;
        debug!(items = parsed.len(), "nutrition estimate");
        Ok(parsed)
    }
}

fn decode_nutrients(body: &[u8]) -> Result<Vec<FoodItem>, ProviderError> {
    let raw: NutrientsResponse = serde_json::from_slice(body)
        .map_err(|e| ProviderError::Malformed(format!("/v2/natural/nutrients: {e}")))?;
    Ok(raw.foods)
}

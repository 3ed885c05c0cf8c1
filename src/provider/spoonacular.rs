use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::{
    DayPlan, Nutrient, ProviderError, RecipeDetail, RecipeProvider, RecipeSummary, SnackQuery,
    WeekPlan,
};
use crate::config::ProviderConfig;
use crate::plans::domain::Weekday;

/// HTTP client for a Spoonacular-compatible recipe API.
#[derive(Clone)]
pub struct SpoonacularClient {
    http: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct WeekResponse {
    week: HashMap<String, DayPlan>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RecipeSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InformationResponse {
    id: i64,
    title: String,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    ready_in_minutes: Option<i32>,
    #[serde(default)]
    servings: Option<i32>,
    #[serde(default)]
    nutrition: Option<NutritionBlock>,
}

#[derive(Deserialize)]
struct NutritionBlock {
    #[serde(default)]
    nutrients: Vec<Nutrient>,
}

impl SpoonacularClient {
    pub fn new(cfg: &ProviderConfig) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(cfg.timeout()).build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout(),
        })
    }

    /// The request URL is stripped so nothing of the endpoint reaches logs or clients.
    fn transport(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(e.without_url().to_string())
        }
    }

    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .get(&url)
            .query(query)
            .header("x-api-key", &self.api_key)
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
        debug!(path, bytes = body.len(), "provider response");
        Ok(body.to_vec())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, ProviderError> {
    serde_json::from_slice(body).map_err(|e| ProviderError::Malformed(format!("{path}: {e}")))
}

fn decode_week(body: &[u8]) -> Result<WeekPlan, ProviderError> {
    let raw: WeekResponse = decode("/mealplanner/generate", body)?;
    let mut by_name = raw.week;
    let mut plan = WeekPlan::default();
    for day in Weekday::ALL {
        let info = by_name
            .remove(day.as_str())
            .ok_or_else(|| ProviderError::Malformed(format!("weekly plan is missing {day}")))?;
        plan.days.insert(day, info);
    }
    Ok(plan)
}

fn decode_detail(body: &[u8]) -> Result<RecipeDetail, ProviderError> {
    let raw: InformationResponse = decode("/recipes/information", body)?;
    Ok(RecipeDetail {
        id: raw.id,
        title: raw.title,
        source_url: raw.source_url,
        image: raw.image,
        ready_in_minutes: raw.ready_in_minutes,
        servings: raw.servings,
        nutrients: raw.nutrition.map(|n| n.nutrients).unwrap_or_default(),
    })
}

fn planner_query(
    time_frame: &str,
    target_calories: i32,
    diet: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("timeFrame", time_frame.to_string()),
        ("targetCalories", target_calories.to_string()),
    ];
    if let Some(diet) = diet.filter(|d| !d.is_empty()) {
        query.push(("diet", diet.to_string()));
    }
    query
}

fn snack_query(q: &SnackQuery) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("number", q.count.to_string()),
        ("minCalories", q.band.min.to_string()),
        ("maxCalories", q.band.max.to_string()),
        ("sort", "random".to_string()),
        ("addRecipeInformation", "true".to_string()),
        ("nocache", cache_buster()),
    ];
    if let Some(diet) = q.diet.as_deref().filter(|d| !d.is_empty()) {
        query.push(("diet", diet.to_string()));
    }
    query
}

fn cache_buster() -> String {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string()
}

#[async_trait]
impl RecipeProvider for SpoonacularClient {
    #[instrument(skip(self))]
    async fn weekly_plan(
        &self,
        target_calories: i32,
        diet: Option<&str>,
    ) -> Result<WeekPlan, ProviderError> {
        let query = planner_query("week", target_calories, diet);
        let body = self.fetch("/mealplanner/generate", &query).await?;
        decode_week(&body)
    }

    #[instrument(skip(self))]
    async fn snack_search(&self, q: &SnackQuery) -> Result<Vec<RecipeSummary>, ProviderError> {
        let query = snack_query(q);
        let body = self.fetch("/recipes/complexSearch", &query).await?;
        let res: SearchResponse = decode("/recipes/complexSearch", &body)?;
        Ok(res.results)
    }

    #[instrument(skip(self))]
    async fn recipe_detail(&self, recipe_id: i64) -> Result<RecipeDetail, ProviderError> {
        let path = format!("/recipes/{recipe_id}/information");
        let body = self
            .fetch(&path, &[("includeNutrition", "true".to_string())])
            .await?;
        decode_detail(&body)
    }

    #[instrument(skip(self))]
    async fn daily_plan(
        &self,
        target_calories: i32,
        diet: Option<&str>,
    ) -> Result<DayPlan, ProviderError> {
        let query = planner_query("day", target_calories, diet);
        let body = self.fetch("/mealplanner/generate", &query).await?;
        decode("/mealplanner/generate", &body)
    }
}

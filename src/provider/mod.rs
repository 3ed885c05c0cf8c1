//! Client side of the external recipe/nutrition provider.
//!
//! The [`RecipeProvider`] trait is the seam the plan pipeline talks to;
//! [`SpoonacularClient`] is the real implementation and [`Bounded`] adds
//! the caller-imposed timeout on top of any provider.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::plans::domain::{CalorieBand, Weekday};

mod spoonacular;
#[cfg(test)]
pub mod fake;

pub use spoonacular::SpoonacularClient;

/// Typed failure of a provider or estimator call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider payload: {0}")]
    Malformed(String),
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
}

/// Recipe as returned by planner and search endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub ready_in_minutes: Option<i32>,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_type: Option<String>,
}

impl RecipeSummary {
    /// Image reference, falling back to the provider's canonical file name
    /// when only the image type is known.
    pub fn image_ref(&self) -> Option<String> {
        match self.image.as_deref().filter(|s| !s.is_empty()) {
            Some(image) => Some(image.to_string()),
            None => self
                .image_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| format!("{}-556x370.{}", self.id, t)),
        }
    }
}

/// Nutrient totals of a planned day, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayNutrients {
    pub calories: f64,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub meals: Vec<RecipeSummary>,
    #[serde(default)]
    pub nutrients: DayNutrients,
}

/// Seven planned days keyed by weekday.
#[derive(Debug, Clone, Default)]
pub struct WeekPlan {
    pub days: BTreeMap<Weekday, DayPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<i32>,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default)]
    pub nutrients: Vec<Nutrient>,
}

impl RecipeDetail {
    /// First nutrient named "Calories", or 0 when the list lacks one.
    pub fn calories(&self) -> f64 {
        self.nutrients
            .iter()
            .find(|n| n.name == "Calories")
            .map(|n| n.amount)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnackQuery {
    pub band: CalorieBand,
    /// `None` searches without a diet filter.
    pub diet: Option<String>,
    pub count: u32,
}

#[async_trait]
pub trait RecipeProvider: Send + Sync {
    async fn weekly_plan(
        &self,
        target_calories: i32,
        diet: Option<&str>,
    ) -> Result<WeekPlan, ProviderError>;

    async fn snack_search(&self, query: &SnackQuery) -> Result<Vec<RecipeSummary>, ProviderError>;

    async fn recipe_detail(&self, recipe_id: i64) -> Result<RecipeDetail, ProviderError>;

    async fn daily_plan(
        &self,
        target_calories: i32,
        diet: Option<&str>,
    ) -> Result<DayPlan, ProviderError>;
}

/// Applies a hard deadline to every call of the wrapped provider.
pub struct Bounded<P> {
    inner: P,
    limit: Duration,
}

impl<P> Bounded<P> {
    pub fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn guard<T>(
        &self,
        call: impl Future<Output = Result<T, ProviderError>> + Send,
    ) -> Result<T, ProviderError> {
        tokio::time::timeout(self.limit, call)
            .await
            .map_err(|_| ProviderError::Timeout(self.limit))?
    }
}

#[async_trait]
impl<P: RecipeProvider> RecipeProvider for Bounded<P> {
    async fn weekly_plan(
        &self,
        target_calories: i32,
        diet: Option<&str>,
    ) -> Result<WeekPlan, ProviderError> {
        self.guard(self.inner.weekly_plan(target_calories, diet)).await
    }

    async fn snack_search(&self, query: &SnackQuery) -> Result<Vec<RecipeSummary>, ProviderError> {
        self.guard(self.inner.snack_search(query)).await
    }

    async fn recipe_detail(&self, recipe_id: i64) -> Result<RecipeDetail, ProviderError> {
        self.guard(self.inner.recipe_detail(recipe_id)).await
    }

    async fn daily_plan(
        &self,
        target_calories: i32,
        diet: Option<&str>,
    ) -> Result<DayPlan, ProviderError> {
        self.guard(self.inner.daily_plan(target_calories, diet)).await
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeProvider;
    use super::*;

    #[test]
    fn image_ref_prefers_explicit_image() {
        let r = RecipeSummary {
            id: 7,
            image: Some("soup.jpg".into()),
            image_type: Some("png".into()),
            ..Default::default()
        };
        assert_eq!(r.image_ref().as_deref(), Some("soup.jpg"));
    }

    #[test]
    fn image_ref_derives_name_from_type() {
        let r = RecipeSummary {
            id: 655219,
            image_type: Some("jpg".into()),
            ..Default::default()
        };
        assert_eq!(r.image_ref().as_deref(), Some("655219-556x370.jpg"));
        assert_eq!(RecipeSummary::default().image_ref(), None);
    }

    #[test]
    fn detail_calories_takes_first_match_or_zero() {
        let mut d = RecipeDetail {
            nutrients: vec![
                Nutrient { name: "Fat".into(), amount: 12.0, unit: Some("g".into()) },
                Nutrient { name: "Calories".into(), amount: 412.5, unit: Some("kcal".into()) },
                Nutrient { name: "Calories".into(), amount: 1.0, unit: None },
            ],
            ..Default::default()
        };
        assert_eq!(d.calories(), 412.5);
        d.nutrients.clear();
        assert_eq!(d.calories(), 0.0);
    }

    #[tokio::test]
    async fn bounded_turns_slow_calls_into_timeouts() {
        let slow = FakeProvider::default().with_delay(Duration::from_millis(200));
        let bounded = Bounded::new(slow, Duration::from_millis(20));
        let err = bounded.recipe_detail(1).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test]
    async fn bounded_passes_fast_calls_through() {
        let bounded = Bounded::new(FakeProvider::default(), Duration::from_secs(5));
        let detail = bounded.recipe_detail(42).await.unwrap();
        assert_eq!(detail.id, 42);
    }
}

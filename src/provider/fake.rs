//! Scriptable in-process provider used by tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    DayNutrients, DayPlan, Nutrient, ProviderError, RecipeDetail, RecipeProvider, RecipeSummary,
    SnackQuery, WeekPlan,
};
use crate::plans::domain::Weekday;

pub struct FakeProvider {
    pub day_calories: f64,
    pub meals_per_day: usize,
    pub snack_pool: usize,
    pub daily_meals: usize,
    pub fail_weekly: bool,
    /// Snack search number (1-based) that fails.
    pub fail_snack_call: Option<usize>,
    pub fail_detail: bool,
    pub delay: Option<Duration>,
    pub weekly_calls: AtomicUsize,
    pub snack_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub daily_targets: Mutex<Vec<i32>>,
    pub snack_queries: Mutex<Vec<SnackQuery>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            day_calories: 2000.0,
            meals_per_day: 3,
            snack_pool: 6,
            daily_meals: 3,
            fail_weekly: false,
            fail_snack_call: None,
            fail_detail: false,
            delay: None,
            weekly_calls: AtomicUsize::new(0),
            snack_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
            daily_targets: Mutex::new(Vec::new()),
            snack_queries: Mutex::new(Vec::new()),
        }
    }
}

impl FakeProvider {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn pause(&self) {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
    }

    fn meal(day: Weekday, idx: usize) -> RecipeSummary {
        let id = 1000 + (day as i64) * 10 + idx as i64;
        RecipeSummary {
            id,
            title: format!("{day} meal {idx}"),
            ready_in_minutes: Some(20 + idx as i32),
            servings: Some(2),
            source_url: Some(format!("https://recipes.test/{id}")),
            image: if idx % 2 == 0 {
                Some(format!("{id}-556x370.jpg"))
            } else {
                Some(format!("https://cdn.test/{id}.jpg"))
            },
            image_type: Some("jpg".into()),
        }
    }

    fn snack(call: usize, idx: usize) -> RecipeSummary {
        let id = 50_000 + (call as i64) * 100 + idx as i64;
        RecipeSummary {
            id,
            title: format!("snack {call}-{idx}"),
            ready_in_minutes: if idx == 0 { None } else { Some(5) },
            servings: if idx == 0 { None } else { Some(3) },
            source_url: Some(format!("https://recipes.test/{id}")),
            image: Some(format!("{id}-312x231.jpg")),
            image_type: None,
        }
    }
}

#[async_trait]
impl RecipeProvider for FakeProvider {
    async fn weekly_plan(
        &self,
        _target_calories: i32,
        _diet: Option<&str>,
    ) -> Result<WeekPlan, ProviderError> {
        self.pause().await;
        self.weekly_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_weekly {
            return Err(ProviderError::Status { status: 402, body: "quota exceeded".into() });
        }
        let mut plan = WeekPlan::default();
        for day in Weekday::ALL {
            let mut other = serde_json::Map::new();
            other.insert("protein".into(), serde_json::json!(90.5));
            plan.days.insert(
                day,
                DayPlan {
                    meals: (0..self.meals_per_day).map(|i| Self::meal(day, i)).collect(),
                    nutrients: DayNutrients { calories: self.day_calories, other },
                },
            );
        }
        Ok(plan)
    }

    async fn snack_search(&self, query: &SnackQuery) -> Result<Vec<RecipeSummary>, ProviderError> {
        self.pause().await;
        let call = self.snack_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.snack_queries.lock().unwrap().push(query.clone());
        if self.fail_snack_call == Some(call) {
            return Err(ProviderError::Transport("connection reset".into()));
        }
        let n = self.snack_pool.min(query.count as usize);
        Ok((0..n).map(|i| Self::snack(call, i)).collect())
    }

    async fn recipe_detail(&self, recipe_id: i64) -> Result<RecipeDetail, ProviderError> {
        self.pause().await;
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detail {
            return Err(ProviderError::Malformed("truncated body".into()));
        }
        Ok(RecipeDetail {
            id: recipe_id,
            title: format!("Fresh recipe {recipe_id}"),
            source_url: Some(format!("https://recipes.test/{recipe_id}")),
            image: Some(format!("{recipe_id}-556x370.jpg")),
            ready_in_minutes: Some(30),
            servings: None,
            nutrients: vec![
                Nutrient { name: "Protein".into(), amount: 20.0, unit: Some("g".into()) },
                Nutrient { name: "Calories".into(), amount: 321.5, unit: Some("kcal".into()) },
            ],
        })
    }

    async fn daily_plan(
        &self,
        target_calories: i32,
        _diet: Option<&str>,
    ) -> Result<DayPlan, ProviderError> {
        self.pause().await;
        self.daily_targets.lock().unwrap().push(target_calories);
        Ok(DayPlan {
            meals: (0..self.daily_meals)
                .map(|i| RecipeSummary {
                    id: 9000 + i as i64,
                    title: format!("daily {i}"),
                    ..Default::default()
                })
                .collect(),
            nutrients: DayNutrients { calories: target_calories as f64, ..Default::default() },
        })
    }
}

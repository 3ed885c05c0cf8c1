use serde::{Deserialize, Serialize};

use super::estimator::FoodItem;
use super::repo_types::LoggedMeal;

#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMealRequest {
    pub description: String,
    pub calories: f64,
}

#[derive(Debug, Serialize)]
pub struct LoggedMealResponse {
    #[serde(flatten)]
    pub meal: LoggedMeal,
    pub items: Vec<FoodItem>,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub meals: Vec<LoggedMeal>,
    pub total_calories: f64,
}

impl From<Vec<LoggedMeal>> for TodayResponse {
    fn from(meals: Vec<LoggedMeal>) -> Self {
        let total_calories = meals.iter().map(|m| m.calories).sum();
        Self {
            meals,
            total_calories,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

impl Pagination {
    pub const MAX_LIMIT: i64 = 100;

    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, Self::MAX_LIMIT), self.offset.max(0))
    }
}

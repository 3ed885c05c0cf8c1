use tracing::{info, instrument};

use super::estimator::{total_calories, FoodItem, NutritionEstimator};
use crate::error::{AppError, AppResult};

pub const MAX_DESCRIPTION_LEN: usize = 500;

pub(crate) fn clean_description(raw: &str) -> AppResult<String> {
    let description = raw.trim();
    if description.is_empty() {
        return Err(AppError::validation("description is required"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::validation(format!(
            "description is longer than {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_string())
}

/// Ask the estimator for the items in `description` and their calorie total.
#[instrument(skip(estimator))]
pub async fn estimate_meal(
    estimator: &dyn NutritionEstimator,
    description: &str,
) -> AppResult<(Vec<FoodItem>, f64)> {
    let items = estimator.estimate(description).await?;
    if items.is_empty() {
        return Err(AppError::validation("no food recognised in description"));
    }
    let calories = total_calories(&items);
    info!(items = items.len(), calories, "meal estimated");
    Ok((items, calories))
}

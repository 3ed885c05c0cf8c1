//! Turns provider responses into the slot set and nutrient snapshot of a plan.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument, warn};

use super::domain::{CalorieBand, SlotType, Weekday};
use super::repo_types::{NewSlot, NutrientMap, SlotContent};
use crate::error::{AppError, AppResult};
use crate::provider::{DayPlan, ProviderError, RecipeProvider, RecipeSummary, SnackQuery};

pub const MEALS_PER_DAY: usize = 3;
pub const SNACKS_PER_DAY: usize = 3;
pub const SNACK_POOL_SIZE: u32 = 6;
pub const GENERATION_SNACK_BAND: CalorieBand = CalorieBand::new(120, 140);
pub const SNACK_DISPLAY_CALORIES: f64 = 130.0;
pub const DEFAULT_SNACK_DIET: &str = "vegetarian";
const SNACK_DEFAULT_READY_IN: i32 = 10;
const SNACK_DEFAULT_SERVINGS: i32 = 1;

#[derive(Debug, Clone, Default)]
pub struct AssembledPlan {
    pub nutrients: NutrientMap,
    pub slots: Vec<NewSlot>,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn has_absolute_scheme(image: &str) -> bool {
    match image.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Absolute image URLs are kept; bare file names get the asset base prepended.
pub fn normalize_image(image: Option<&str>, base: &str) -> Option<String> {
    let image = image.map(str::trim).filter(|s| !s.is_empty())?;
    if has_absolute_scheme(image) {
        Some(image.to_string())
    } else {
        Some(format!("{}{}", base, image.trim_start_matches('/')))
    }
}

/// Meal slots of one planned day, named by position.
///
/// Every meal shows a third of the day's total calories.
pub fn meal_slots(day: Weekday, plan: &DayPlan, image_base: &str) -> Result<Vec<NewSlot>, ProviderError> {
    if plan.meals.len() < MEALS_PER_DAY {
        return Err(ProviderError::Malformed(format!(
            "{day} has {} meals, expected {MEALS_PER_DAY}",
            plan.meals.len()
        )));
    }
    if plan.meals.len() > MEALS_PER_DAY {
        warn!(%day, meals = plan.meals.len(), "provider returned extra meals");
    }
    let calories = round2(plan.nutrients.calories / MEALS_PER_DAY as f64);
    Ok(plan
        .meals
        .iter()
        .enumerate()
        .map(|(index, meal)| NewSlot {
            day_of_week: day,
            slot_type: SlotType::for_meal_index(index),
            content: SlotContent {
                title: meal.title.clone(),
                calories,
                source_url: meal.source_url.clone(),
                image_url: normalize_image(meal.image_ref().as_deref(), image_base),
                ready_in: meal.ready_in_minutes,
                servings: meal.servings,
            },
        })
        .collect())
}

/// Shuffle the candidate pool and keep the first three as snack1..snack3.
pub fn pick_snacks<R: Rng + ?Sized>(
    day: Weekday,
    mut pool: Vec<RecipeSummary>,
    rng: &mut R,
    image_base: &str,
) -> AppResult<Vec<NewSlot>> {
    if pool.len() < SNACKS_PER_DAY {
        return Err(AppError::not_found(format!(
            "only {} snack candidates for {day}",
            pool.len()
        )));
    }
    pool.shuffle(rng);
    Ok(pool
        .into_iter()
        .take(SNACKS_PER_DAY)
        .enumerate()
        .map(|(i, snack)| NewSlot {
            day_of_week: day,
            slot_type: SlotType::Snack(i as u8 + 1),
            content: SlotContent {
                image_url: normalize_image(snack.image_ref().as_deref(), image_base),
                title: snack.title,
                calories: SNACK_DISPLAY_CALORIES,
                source_url: snack.source_url,
                ready_in: Some(snack.ready_in_minutes.unwrap_or(SNACK_DEFAULT_READY_IN)),
                servings: Some(snack.servings.unwrap_or(SNACK_DEFAULT_SERVINGS)),
            },
        })
        .collect())
}

/// Fetch the week plus one snack pool per day and build the full slot set.
///
/// Nothing is persisted here; any provider failure aborts the whole week.
#[instrument(skip(provider, rng))]
pub async fn assemble_week<R: Rng + Send + ?Sized>(
    provider: &dyn RecipeProvider,
    image_base: &str,
    target_calories: i32,
    diet: Option<&str>,
    rng: &mut R,
) -> AppResult<AssembledPlan> {
    let week = provider.weekly_plan(target_calories, diet).await?;

    let snack_query = SnackQuery {
        band: GENERATION_SNACK_BAND,
        diet: Some(
            diet.filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_SNACK_DIET)
                .to_string(),
        ),
        count: SNACK_POOL_SIZE,
    };

    let mut out = AssembledPlan::default();
    for (day, plan) in &week.days {
        out.nutrients.insert(*day, plan.nutrients.clone());
        out.slots.extend(meal_slots(*day, plan, image_base)?);
    }
    for day in week.days.keys() {
        let pool = provider.snack_search(&snack_query).await?;
        debug!(%day, candidates = pool.len(), "snack pool");
        out.slots.extend(pick_snacks(*day, pool, rng, image_base)?);
    }
    Ok(out)
}

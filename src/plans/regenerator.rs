//! Replaces one slot of the current plan with a freshly chosen recipe.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, instrument};
use uuid::Uuid;

use super::assembler::normalize_image;
use super::domain::{CalorieBand, SlotType, Weekday};
use super::repo_types::{MealSlot, SlotContent};
use crate::error::{AppError, AppResult};
use crate::provider::{RecipeDetail, RecipeProvider, RecipeSummary, SnackQuery};
use crate::state::AppState;
use crate::users::repo::Preferences;

pub const REGEN_SNACK_BAND: CalorieBand = CalorieBand::new(100, 180);
pub const REGEN_SNACK_COUNT: u32 = 5;
/// Kcal taken off the daily target when asking for a one-day plan.
pub const MEAL_TARGET_OFFSET: i32 = 400;

async fn snack_candidate<R: Rng + Send + ?Sized>(
    provider: &dyn RecipeProvider,
    prefs: &Preferences,
    rng: &mut R,
) -> AppResult<RecipeSummary> {
    let query = SnackQuery {
        band: REGEN_SNACK_BAND,
        diet: prefs.diet.clone().filter(|d| !d.is_empty()),
        count: REGEN_SNACK_COUNT,
    };
    let snacks = provider.snack_search(&query).await?;
    snacks
        .choose(rng)
        .cloned()
        .ok_or_else(|| AppError::not_found("No snack found."))
}

async fn meal_candidate(
    provider: &dyn RecipeProvider,
    prefs: &Preferences,
    slot_type: SlotType,
) -> AppResult<RecipeSummary> {
    let target = prefs.calorie_target - MEAL_TARGET_OFFSET;
    let day = provider.daily_plan(target, prefs.diet.as_deref()).await?;
    slot_type
        .meal_index()
        .and_then(|i| day.meals.get(i))
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("No {slot_type} found.")))
}

fn content_from_detail(detail: RecipeDetail, image_base: &str) -> SlotContent {
    SlotContent {
        calories: detail.calories(),
        image_url: normalize_image(detail.image.as_deref(), image_base),
        title: detail.title,
        source_url: detail.source_url,
        ready_in: detail.ready_in_minutes,
        servings: Some(detail.servings.unwrap_or(1)),
    }
}

/// Regenerate the slot `(day, slot_type)` of the user's plan.
///
/// Sibling slots and the nutrient snapshot are left as they are. Nothing is
/// written unless a candidate and its full recipe were fetched.
#[instrument(skip(st, rng))]
pub async fn regenerate_slot<R: Rng + Send + ?Sized>(
    st: &AppState,
    user_id: Uuid,
    day: &str,
    slot_type: &str,
    rng: &mut R,
) -> AppResult<MealSlot> {
    let day: Weekday = day.parse().map_err(AppError::Validation)?;
    let slot_type: SlotType = slot_type.parse().map_err(AppError::Validation)?;

    let prefs = st
        .profiles
        .preferences(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;

    let candidate = if slot_type.is_snack() {
        snack_candidate(st.provider.as_ref(), &prefs, rng).await?
    } else {
        meal_candidate(st.provider.as_ref(), &prefs, slot_type).await?
    };

    let detail = st.provider.recipe_detail(candidate.id).await?;
    let content = content_from_detail(detail, &st.config.provider.image_base_url);

    let slot = st
        .plans
        .upsert_slot(user_id, day, slot_type, &content)
        .await?
        .ok_or_else(|| AppError::not_found("Meal not found to update."))?;

    info!(%user_id, %day, %slot_type, title = %slot.content.title, "slot regenerated");
    Ok(slot)
}

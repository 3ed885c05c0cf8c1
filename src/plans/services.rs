use rand::Rng;
use tracing::{info, instrument};
use uuid::Uuid;

use super::assembler::assemble_week;
use super::dto::GeneratePlanRequest;
use super::reader::{plan_view, PlanView};
use super::regenerator::MEAL_TARGET_OFFSET;
use super::repo_types::MealPlan;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Resolve the calorie target and diet for a generation request, falling
/// back to the user's profile for whatever the request leaves out.
async fn resolve_targets(
    st: &AppState,
    user_id: Uuid,
    req: GeneratePlanRequest,
) -> AppResult<(i32, Option<String>)> {
    if let (Some(target), Some(diet)) = (req.target_calories, req.diet.as_ref()) {
        return Ok((target, Some(diet.clone())));
    }
    let prefs = st
        .profiles
        .preferences(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;
    let target = req
        .target_calories
        .unwrap_or(prefs.calorie_target - MEAL_TARGET_OFFSET);
    Ok((target, req.diet.or(prefs.diet)))
}

/// Generate a fresh week and make it the user's only plan.
#[instrument(skip(st, rng))]
pub async fn generate_plan<R: Rng + Send + ?Sized>(
    st: &AppState,
    user_id: Uuid,
    req: GeneratePlanRequest,
    rng: &mut R,
) -> AppResult<MealPlan> {
    let (target, diet) = resolve_targets(st, user_id, req).await?;
    if target <= 0 {
        return Err(AppError::validation("target_calories must be positive"));
    }
    let diet = diet.filter(|d| !d.trim().is_empty());

    let assembled = assemble_week(
        st.provider.as_ref(),
        &st.config.provider.image_base_url,
        target,
        diet.as_deref(),
        rng,
    )
    .await?;

    let plan = st
        .plans
        .replace_plan(user_id, &assembled.nutrients, &assembled.slots)
        .await
        .map_err(AppError::Store)?;

    info!(%user_id, plan_id = %plan.id, slots = assembled.slots.len(), target, "meal plan stored");
    Ok(plan)
}

#[instrument(skip(st))]
pub async fn current_plan(st: &AppState, user_id: Uuid) -> AppResult<PlanView> {
    let plan = st
        .plans
        .latest_plan(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("No meal plan found for this user."))?;
    let slots = st.plans.slots(plan.id, user_id).await?;
    Ok(plan_view(plan, slots))
}

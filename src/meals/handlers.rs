use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{LogMealRequest, LoggedMealResponse, Pagination, TodayResponse, UpdateMealRequest};
use super::repo_types::LoggedMeal;
use super::services::{clean_description, estimate_meal};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(log_meal))
        .route("/meals/today", get(today))
        .route("/meals/:id", put(update_meal).delete(delete_meal))
}

#[instrument(skip(state, body))]
pub async fn log_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogMealRequest>,
) -> AppResult<(StatusCode, Json<LoggedMealResponse>)> {
    let description = clean_description(&body.description)?;
    let (items, calories) = estimate_meal(state.estimator.as_ref(), &description).await?;
    let meal = LoggedMeal::create(&state.db, user_id, &description, calories).await?;
    info!(%user_id, meal_id = %meal.id, calories, "meal logged");
    Ok((StatusCode::CREATED, Json(LoggedMealResponse { meal, items })))
}

#[instrument(skip(state))]
pub async fn today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<TodayResponse>> {
    let meals = LoggedMeal::list_today(&state.db, user_id).await?;
    Ok(Json(meals.into()))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<LoggedMeal>>> {
    let (limit, offset) = p.clamped();
    Ok(Json(LoggedMeal::list_by_user(&state.db, user_id, limit, offset).await?))
}

#[instrument(skip(state, body))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMealRequest>,
) -> AppResult<Json<LoggedMeal>> {
    let description = clean_description(&body.description)?;
    if !body.calories.is_finite() || body.calories < 0.0 {
        return Err(AppError::validation("calories must be a non-negative number"));
    }
    let meal = LoggedMeal::update(&state.db, user_id, id, &description, body.calories)
        .await?
        .ok_or_else(|| AppError::not_found("Meal not found."))?;
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !LoggedMeal::delete(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Meal not found."));
    }
    info!(%user_id, meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

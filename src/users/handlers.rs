use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{ProfileInput, ProfileResponse};
use super::repo_types::User;
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    meals::repo_types::LoggedMeal,
    state::AppState,
};

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/profile", put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;
    let consumed = LoggedMeal::consumed_today(&state.db, user_id).await?;
    Ok(Json(ProfileResponse::new(user, consumed)))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ProfileInput>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = payload.normalized().map_err(AppError::Validation)?;
    let target = profile.physiology().daily_calorie_target();

    let user = User::update_profile(&state.db, user_id, &profile, target)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;
    let consumed = LoggedMeal::consumed_today(&state.db, user_id).await?;

    info!(%user_id, calorie_target = target, "profile updated");
    Ok(Json(ProfileResponse::new(user, consumed)))
}
